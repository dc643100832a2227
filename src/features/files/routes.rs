use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};
use std::sync::Arc;

use crate::features::files::dtos::{MAX_FILES_PER_UPLOAD, MAX_FILE_SIZE};
use crate::features::files::handlers::{download_collection_zip, download_file, upload_multiple};
use crate::features::files::services::FileService;

/// Upload route (requires authentication)
pub fn upload_routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route(
            "/api/upload-multiple",
            // Every file at its limit plus a buffer for multipart overhead
            post(upload_multiple).layer(DefaultBodyLimit::max(
                MAX_FILES_PER_UPLOAD * MAX_FILE_SIZE + 1024 * 1024,
            )),
        )
        .with_state(file_service)
}

/// Download routes; access is decided by the service's download policy
pub fn download_routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route("/api/download/{file_id}", get(download_file))
        .route(
            "/api/download-collection/{id}/zip",
            get(download_collection_zip),
        )
        .with_state(file_service)
}
