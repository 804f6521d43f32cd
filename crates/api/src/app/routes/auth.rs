//! Public sign-in routes.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;

use inkwell_auth::SignedToken;

use crate::app::{
    dto::{LoginRequest, RegisterRequest, TokenResponse},
    errors::ApiError,
    services::AppServices,
};

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

/// POST /login - Exchange username/password for a token
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let signed = services.login(&body.username, &body.password).await?;
    Ok(token_response(&services, StatusCode::OK, &signed))
}

/// POST /register - Create a member account and sign in
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let (_subject_id, signed) = services.register(body).await?;
    Ok(token_response(&services, StatusCode::CREATED, &signed))
}

/// Token in the body and in an HTTP-only cookie; never cached.
fn token_response(services: &AppServices, status: StatusCode, signed: &SignedToken) -> Response {
    let jar = CookieJar::new().add(services.session_cookie(signed));
    (
        status,
        jar,
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(TokenResponse::from(signed)),
    )
        .into_response()
}
