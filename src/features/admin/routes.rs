use std::sync::Arc;

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes (all require admin access)
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/{id}", delete(handlers::delete_user))
        .route("/users/{id}/suspension", put(handlers::set_user_suspension))
        .route("/collections", get(handlers::list_collections))
        .with_state(admin_service)
}
