//! Blog content: posts and comments.
//!
//! Both carry the identifier of their author; that field is what ownership
//! checks compare against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CommentId, DomainError, DomainResult, PostId, SubjectId};

fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be blank")));
    }
    Ok(())
}

/// Input for creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

impl PostDraft {
    pub fn validate(&self) -> DomainResult<()> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)
    }
}

/// Partial update of a post; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

impl PostUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(content) = &self.content {
            require_text("content", content)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub published_at: DateTime<Utc>,
    pub author_id: SubjectId,
    pub author_username: String,
}

impl Post {
    /// Build a post from a validated draft.
    pub fn create(
        id: PostId,
        draft: PostDraft,
        author_id: SubjectId,
        author_username: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            title: draft.title,
            content: draft.content,
            published: draft.published,
            published_at: now,
            author_id,
            author_username: author_username.into(),
        })
    }

    /// Apply a partial update. Publishing a draft post stamps `published_at`.
    pub fn apply(&mut self, update: PostUpdate, now: DateTime<Utc>) -> DomainResult<()> {
        update.validate()?;
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(published) = update.published {
            if published && !self.published {
                self.published_at = now;
            }
            self.published = published;
        }
        Ok(())
    }
}

/// Input for creating a comment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentDraft {
    pub post_id: PostId,
    pub content: String,
}

impl CommentDraft {
    pub fn validate(&self) -> DomainResult<()> {
        require_text("content", &self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: SubjectId,
    pub author_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn create(
        id: CommentId,
        draft: CommentDraft,
        author_id: SubjectId,
        author_username: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            post_id: draft.post_id,
            author_id,
            author_username: author_username.into(),
            content: draft.content,
            created_at: now,
        })
    }

    pub fn edit(&mut self, content: String) -> DomainResult<()> {
        require_text("content", &content)?;
        self.content = content;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn draft(title: &str, content: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            content: content.to_string(),
            published: false,
        }
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = Post::create(PostId::new(), draft("   ", "body"), "u1".into(), "alice", t0())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn publishing_stamps_published_at_once() {
        let mut post =
            Post::create(PostId::new(), draft("Hello", "body"), "u1".into(), "alice", t0()).unwrap();

        let later = t0() + Duration::minutes(5);
        post.apply(PostUpdate { published: Some(true), ..Default::default() }, later)
            .unwrap();
        assert!(post.published);
        assert_eq!(post.published_at, later);

        // Re-publishing keeps the original timestamp.
        post.apply(
            PostUpdate { published: Some(true), ..Default::default() },
            later + Duration::minutes(1),
        )
        .unwrap();
        assert_eq!(post.published_at, later);
    }

    #[test]
    fn update_with_blank_content_leaves_post_untouched() {
        let mut post =
            Post::create(PostId::new(), draft("Hello", "body"), "u1".into(), "alice", t0()).unwrap();
        let before = post.clone();

        let err = post
            .apply(
                PostUpdate {
                    title: Some("New".into()),
                    content: Some("".into()),
                    published: None,
                },
                t0(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(post, before);
    }

    #[test]
    fn post_draft_defaults_to_published() {
        let d: PostDraft = serde_json::from_str(r#"{"title":"t","content":"c"}"#).unwrap();
        assert!(d.published);
    }

    #[test]
    fn comment_edit_requires_text() {
        let mut c = Comment::create(
            CommentId::new(),
            CommentDraft { post_id: PostId::new(), content: "nice".into() },
            "u2".into(),
            "bob",
            t0(),
        )
        .unwrap();

        assert!(c.edit(" ".into()).is_err());
        c.edit("nicer".into()).unwrap();
        assert_eq!(c.content, "nicer");
    }
}
