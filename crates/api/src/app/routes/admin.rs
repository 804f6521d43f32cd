//! Administrator-only moderation routes.
//!
//! These skip ownership entirely: the caller must hold the administrator
//! capability.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::delete,
    Router,
};

use inkwell_core::{CommentId, PostId};

use crate::app::{errors::ApiError, services::AppServices};
use crate::authz;
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/posts/:id", delete(delete_post))
        .route("/comments/:id", delete(delete_comment))
}

/// DELETE /api/admin/posts/:id
pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authz::require_admin(&services.guard, &ctx).await?;

    let id = PostId::from_str(&id)?;
    let post = services.content.delete_post(id)?;
    tracing::info!(post_id = %id, author_id = %post.author_id, admin = %ctx.subject_id(), "post removed by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/comments/:id
pub async fn delete_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authz::require_admin(&services.guard, &ctx).await?;

    let id = CommentId::from_str(&id)?;
    let comment = services.content.delete_comment(id)?;
    tracing::info!(comment_id = %id, author_id = %comment.author_id, admin = %ctx.subject_id(), "comment removed by admin");
    Ok(StatusCode::NO_CONTENT)
}
