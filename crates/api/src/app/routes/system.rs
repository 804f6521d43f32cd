use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::AuthContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /api/whoami - Identity bound to the current request
pub async fn whoami(Extension(ctx): Extension<AuthContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "subject_id": ctx.subject_id(),
        "username": ctx.display_name(),
        "expires_at": ctx.identity().expires_at().timestamp(),
    }))
}
