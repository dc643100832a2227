use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Public auth routes (no authentication required)
///
/// Logout and upgrade carry their token in the request body.
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/register-user", post(handlers::register))
        .route("/api/auth/register-admin", post(handlers::register_admin))
        .route("/api/auth/login-user", post(handlers::login))
        .route(
            "/api/auth/logout-one-device",
            post(handlers::logout_one_device),
        )
        .route(
            "/api/auth/logout-all-devices",
            post(handlers::logout_all_devices),
        )
        .route(
            "/api/auth/upgrade-user-to-admin",
            post(handlers::upgrade_user_to_admin),
        )
        .with_state(service)
}

/// Protected auth routes (require a bearer session token)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/me", get(handlers::get_me))
        .with_state(service)
}
