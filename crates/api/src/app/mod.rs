//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, hasher, token service, guard
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use inkwell_auth::{SigningKey, TokenService};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Fails if the signing secret is unusable or the bootstrap admin cannot be
/// created.
pub async fn build_app(config: ApiConfig) -> anyhow::Result<Router> {
    let key = SigningKey::from_secret(&config.signing_secret).context("invalid signing secret")?;
    let tokens = Arc::new(TokenService::new(&key));
    let auth_state = middleware::AuthState {
        tokens: tokens.clone(),
    };

    let services = Arc::new(
        services::AppServices::new(tokens, config.secure_cookies())
            .context("initializing password hasher")?,
    );
    if let Some(admin) = &config.bootstrap_admin {
        services
            .ensure_admin(admin)
            .await
            .map_err(|e| anyhow::anyhow!("bootstrap admin '{}': {e}", admin.username))?;
    }

    // Protected routes: require a verified bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::auth::router())
        .nest("/api", protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
}
