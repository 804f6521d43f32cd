use std::sync::Arc;

use axum::{extract::Extension, routing::get, Json, Router};
use chrono::Utc;

use inkwell_infra::{ProfileUpdate, UserProfile};

use crate::app::{dto::UpdateProfileRequest, errors::ApiError, services::AppServices};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new().route("/", get(get_profile).put(update_profile))
}

/// GET /api/profile - The caller's own profile
pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<UserProfile>, ApiError> {
    let record = services.users.get(ctx.subject_id())?;
    Ok(Json(record.profile()))
}

/// PUT /api/profile - Update bio / profile picture
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let update = ProfileUpdate {
        bio: body.bio,
        profile_pic_url: body.profile_pic_url,
    };
    let record = services.users.update_profile(ctx.subject_id(), update, Utc::now())?;
    Ok(Json(record.profile()))
}
