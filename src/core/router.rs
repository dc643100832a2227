use axum::{http::StatusCode, routing::get, Router};
use std::sync::Arc;

use crate::core::middleware;
use crate::features::admin::{self, AdminService};
use crate::features::auth::{self, AuthService};
use crate::features::collections::{self, CollectionService};
use crate::features::files::{self, FileService};

/// Feature services shared by the route handlers
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub collections: Arc<CollectionService>,
    pub files: Arc<FileService>,
    pub admin: Arc<AdminService>,
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All API routes, without the swagger UI and outer tower layers
pub fn api_router(services: &AppServices) -> Router {
    // Protected routes (require a bearer session token)
    let protected_routes = Router::new()
        .merge(auth::routes::protected_routes(Arc::clone(&services.auth)))
        .merge(collections::routes::routes(Arc::clone(&services.collections)))
        .merge(files::upload_routes(Arc::clone(&services.files)))
        .nest("/api/admin", admin::routes(Arc::clone(&services.admin)))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&services.auth),
            middleware::auth_middleware,
        ));

    // Public routes; downloads apply their own access policy
    let public_routes = Router::new()
        .merge(auth::routes::public_routes(Arc::clone(&services.auth)))
        .merge(files::download_routes(Arc::clone(&services.files)));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .route("/health", get(health_check))
}
