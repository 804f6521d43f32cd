use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    routing::get,
    Json, Router,
};

use inkwell_core::SubjectId;
use inkwell_infra::UserProfile;

use crate::app::{errors::ApiError, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
}

/// GET /api/users - All users (public profile fields only)
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    Ok(Json(services.users.list()?))
}

/// GET /api/users/:id
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let record = services.users.get(&SubjectId::new(id))?;
    Ok(Json(record.profile()))
}
