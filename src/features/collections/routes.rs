use crate::features::collections::handlers;
use crate::features::collections::services::CollectionService;
use axum::{
    routing::{delete, get},
    Router,
};
use std::sync::Arc;

/// Collection routes (require authentication)
pub fn routes(service: Arc<CollectionService>) -> Router {
    Router::new()
        .route("/api/collections", get(handlers::list_collections))
        .route(
            "/api/collections/{id}",
            get(handlers::get_collection)
                .put(handlers::rename_collection)
                .delete(handlers::delete_collection),
        )
        .route(
            "/api/collections/{id}/files",
            get(handlers::get_collection_files),
        )
        .route("/api/files/{file_id}", delete(handlers::delete_file))
        .with_state(service)
}
