use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;

use inkwell_auth::ResourceRef;
use inkwell_core::{Comment, Post, PostDraft, PostId, PostUpdate, SubjectId};

use crate::app::{dto::Pagination, errors::ApiError, services::AppServices};
use crate::authz;
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/user/:user_id", get(posts_by_user))
        .route("/:id", get(get_post).put(update_post).delete(delete_post))
        .route("/:id/comments", get(list_comments))
}

/// GET /api/posts - Newest first; `limit` (default 10) and `skip`
pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(services.content.list_posts(page.limit(), page.skip())?))
}

/// POST /api/posts - Create a post authored by the caller
pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(draft): Json<PostDraft>,
) -> Result<Response, ApiError> {
    let post = Post::create(
        PostId::new(),
        draft,
        ctx.subject_id().clone(),
        ctx.display_name(),
        Utc::now(),
    )?;
    let post = services.content.insert_post(post)?;
    tracing::info!(post_id = %post.id, subject_id = %ctx.subject_id(), "post created");
    Ok((StatusCode::CREATED, Json(post)).into_response())
}

/// GET /api/posts/:id
pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let id = PostId::from_str(&id)?;
    Ok(Json(services.content.get_post(id)?))
}

/// GET /api/posts/user/:user_id - A user's posts (self or admin)
pub async fn posts_by_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let owner = SubjectId::new(user_id);
    authz::authorize_owner_or_admin(&services.guard, ctx.identity(), &owner).await?;
    Ok(Json(services.content.posts_by_author(&owner)?))
}

/// PUT /api/posts/:id - Owner or admin
pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(update): Json<PostUpdate>,
) -> Result<Json<Post>, ApiError> {
    authz::authorize_mutation(&services.guard, &*services.content, &ctx, ResourceRef::post(&id))
        .await?;

    let id = PostId::from_str(&id)?;
    Ok(Json(services.content.update_post(id, update, Utc::now())?))
}

/// DELETE /api/posts/:id - Owner or admin; removes the post's comments too
pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authz::authorize_mutation(&services.guard, &*services.content, &ctx, ResourceRef::post(&id))
        .await?;

    let id = PostId::from_str(&id)?;
    services.content.delete_post(id)?;
    tracing::info!(post_id = %id, subject_id = %ctx.subject_id(), "post deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/posts/:id/comments - Oldest first
pub async fn list_comments(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let id = PostId::from_str(&id)?;
    Ok(Json(services.content.comments_for_post(id)?))
}
