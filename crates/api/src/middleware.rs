use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use inkwell_auth::{AuthError, TokenVerifier};

use crate::app::errors::ApiError;
use crate::context::AuthContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenVerifier>,
}

/// Authenticate a request from its bearer token.
///
/// On success the verified identity is bound as [`AuthContext`]; any failure
/// ends the request with a generic 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = extract_bearer(req.headers())
        .and_then(|token| state.tokens.verify(token))
        .map_err(|e| {
            tracing::debug!(error = %e, path = %req.uri().path(), "authentication failed");
            e
        })?;

    AuthContext::bind(req.extensions_mut(), identity)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(next.run(req).await)
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?;

    let header = header.to_str().map_err(|_| AuthError::MalformedToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedToken)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MalformedToken);
    }

    Ok(token)
}
