use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use inkwell_auth::{ResourceKind, ResourceOwnership, ResourceRef, ResourceStore, StoreError};
use inkwell_core::{Comment, CommentId, DomainError, Post, PostId, PostUpdate, SubjectId};

use super::{read, write};
use crate::InfraResult;

#[derive(Debug, Default)]
struct ContentTable {
    posts: HashMap<PostId, Post>,
    comments: HashMap<CommentId, Comment>,
}

/// In-memory posts and comments; also the resource store for ownership checks.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    inner: RwLock<ContentTable>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_post(&self, post: Post) -> InfraResult<Post> {
        let mut table = write(&self.inner, "content store")?;
        if table.posts.contains_key(&post.id) {
            return Err(DomainError::conflict(format!("post {} already exists", post.id)).into());
        }
        table.posts.insert(post.id, post.clone());
        Ok(post)
    }

    /// Newest first, paginated.
    pub fn list_posts(&self, limit: usize, skip: usize) -> InfraResult<Vec<Post>> {
        let table = read(&self.inner, "content store")?;
        let mut posts: Vec<Post> = table.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(posts.into_iter().skip(skip).take(limit).collect())
    }

    pub fn posts_by_author(&self, author_id: &SubjectId) -> InfraResult<Vec<Post>> {
        let table = read(&self.inner, "content store")?;
        let mut posts: Vec<Post> = table
            .posts
            .values()
            .filter(|p| &p.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(posts)
    }

    pub fn get_post(&self, id: PostId) -> InfraResult<Post> {
        let table = read(&self.inner, "content store")?;
        table
            .posts
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("post").into())
    }

    pub fn update_post(&self, id: PostId, update: PostUpdate, now: DateTime<Utc>) -> InfraResult<Post> {
        let mut table = write(&self.inner, "content store")?;
        let post = table
            .posts
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("post"))?;
        post.apply(update, now)?;
        Ok(post.clone())
    }

    /// Remove a post together with its comments.
    pub fn delete_post(&self, id: PostId) -> InfraResult<Post> {
        let mut table = write(&self.inner, "content store")?;
        let post = table
            .posts
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("post"))?;

        let before = table.comments.len();
        table.comments.retain(|_, c| c.post_id != id);
        tracing::debug!(post_id = %id, comments_removed = before - table.comments.len(), "post deleted");
        Ok(post)
    }

    /// Insert a comment; its post must exist.
    pub fn insert_comment(&self, comment: Comment) -> InfraResult<Comment> {
        let mut table = write(&self.inner, "content store")?;
        if !table.posts.contains_key(&comment.post_id) {
            return Err(DomainError::not_found("post").into());
        }
        if table.comments.contains_key(&comment.id) {
            return Err(DomainError::conflict(format!("comment {} already exists", comment.id)).into());
        }
        table.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    /// Comments on a post, oldest first.
    pub fn comments_for_post(&self, post_id: PostId) -> InfraResult<Vec<Comment>> {
        let table = read(&self.inner, "content store")?;
        if !table.posts.contains_key(&post_id) {
            return Err(DomainError::not_found("post").into());
        }
        let mut comments: Vec<Comment> = table
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    pub fn update_comment(&self, id: CommentId, content: String) -> InfraResult<Comment> {
        let mut table = write(&self.inner, "content store")?;
        let comment = table
            .comments
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("comment"))?;
        comment.edit(content)?;
        Ok(comment.clone())
    }

    pub fn delete_comment(&self, id: CommentId) -> InfraResult<Comment> {
        let mut table = write(&self.inner, "content store")?;
        table
            .comments
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("comment").into())
    }
}

#[async_trait]
impl ResourceStore for InMemoryContentStore {
    async fn owner_of(&self, resource: &ResourceRef) -> Result<Option<ResourceOwnership>, StoreError> {
        let table = read(&self.inner, "content store")?;

        // An id that does not parse cannot name an existing resource.
        let owner = match resource.kind {
            ResourceKind::Post => PostId::from_str(&resource.id)
                .ok()
                .and_then(|id| table.posts.get(&id))
                .map(|p| p.author_id.clone()),
            ResourceKind::Comment => CommentId::from_str(&resource.id)
                .ok()
                .and_then(|id| table.comments.get(&id))
                .map(|c| c.author_id.clone()),
        };

        Ok(owner.map(|owner| ResourceOwnership {
            resource: resource.clone(),
            owner,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use inkwell_core::{CommentDraft, PostDraft};

    use super::*;
    use crate::InfraError;

    fn post_by(author: &str, title: &str, at: DateTime<Utc>) -> Post {
        Post::create(
            PostId::new(),
            PostDraft { title: title.into(), content: "body".into(), published: true },
            author.into(),
            author,
            at,
        )
        .unwrap()
    }

    fn comment_on(post: &Post, author: &str) -> Comment {
        Comment::create(
            CommentId::new(),
            CommentDraft { post_id: post.id, content: "hi".into() },
            author.into(),
            author,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn posts_are_listed_newest_first_with_paging() {
        let store = InMemoryContentStore::new();
        let t0 = Utc::now();
        for i in 0..5 {
            store.insert_post(post_by("u1", &format!("p{i}"), t0 + Duration::seconds(i))).unwrap();
        }

        let page = store.list_posts(2, 1).unwrap();
        let titles: Vec<&str> = page.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["p3", "p2"]);
    }

    #[test]
    fn deleting_a_post_removes_its_comments() {
        let store = InMemoryContentStore::new();
        let post = store.insert_post(post_by("u1", "hello", Utc::now())).unwrap();
        let other = store.insert_post(post_by("u1", "other", Utc::now())).unwrap();
        let c1 = store.insert_comment(comment_on(&post, "u2")).unwrap();
        let c2 = store.insert_comment(comment_on(&other, "u2")).unwrap();

        store.delete_post(post.id).unwrap();

        assert!(matches!(
            store.update_comment(c1.id, "edited".into()),
            Err(InfraError::Domain(DomainError::NotFound("comment")))
        ));
        let remaining = store.comments_for_post(other.id).unwrap();
        assert_eq!(remaining.iter().map(|c| c.id).collect::<Vec<_>>(), vec![c2.id]);
    }

    #[test]
    fn comment_on_missing_post_is_not_found() {
        let store = InMemoryContentStore::new();
        let ghost = post_by("u1", "ghost", Utc::now());

        let err = store.insert_comment(comment_on(&ghost, "u2")).unwrap_err();
        assert_eq!(err, InfraError::Domain(DomainError::NotFound("post")));
    }

    #[tokio::test]
    async fn owner_lookup_resolves_posts_and_comments() {
        let store = InMemoryContentStore::new();
        let post = store.insert_post(post_by("u1", "hello", Utc::now())).unwrap();
        let comment = store.insert_comment(comment_on(&post, "u2")).unwrap();

        let p = store.owner_of(&ResourceRef::post(post.id.to_string())).await.unwrap().unwrap();
        assert_eq!(p.owner.as_str(), "u1");

        let c = store
            .owner_of(&ResourceRef::comment(comment.id.to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(c.owner.as_str(), "u2");

        assert!(store.owner_of(&ResourceRef::post("nope")).await.unwrap().is_none());
        assert!(store
            .owner_of(&ResourceRef::comment(PostId::new().to_string()))
            .await
            .unwrap()
            .is_none());
    }
}
