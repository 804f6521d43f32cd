use axum::{routing::get, Router};

pub mod admin;
pub mod auth;
pub mod comments;
pub mod posts;
pub mod profile;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/profile", profile::router())
        .nest("/users", users::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/admin", admin::router())
}
