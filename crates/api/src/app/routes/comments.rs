use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use chrono::Utc;

use inkwell_auth::ResourceRef;
use inkwell_core::{Comment, CommentDraft, CommentId};

use crate::app::{dto::UpdateCommentRequest, errors::ApiError, services::AppServices};
use crate::authz;
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_comment))
        .route("/:id", put(update_comment).delete(delete_comment))
}

/// POST /api/comments - Comment on an existing post
pub async fn create_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(draft): Json<CommentDraft>,
) -> Result<Response, ApiError> {
    let comment = Comment::create(
        CommentId::new(),
        draft,
        ctx.subject_id().clone(),
        ctx.display_name(),
        Utc::now(),
    )?;
    let comment = services.content.insert_comment(comment)?;
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

/// PUT /api/comments/:id - Owner or admin
pub async fn update_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    authz::authorize_mutation(&services.guard, &*services.content, &ctx, ResourceRef::comment(&id))
        .await?;

    let id = CommentId::from_str(&id)?;
    Ok(Json(services.content.update_comment(id, body.content)?))
}

/// DELETE /api/comments/:id - Owner or admin
pub async fn delete_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authz::authorize_mutation(&services.guard, &*services.content, &ctx, ResourceRef::comment(&id))
        .await?;

    let id = CommentId::from_str(&id)?;
    services.content.delete_comment(id)?;
    Ok(StatusCode::NO_CONTENT)
}
