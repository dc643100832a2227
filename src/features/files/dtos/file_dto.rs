use serde::{Deserialize, Serialize};
use std::path::Path;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Upload form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFilesDto {
    /// Collection the files are added to, created on first use
    #[schema(example = "Homework")]
    pub collection_name: String,
    /// Up to 6 files, repeated under the `files` field
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Vec<String>,
}

/// Result of an upload request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResultDto {
    pub collection_id: Uuid,
    pub collection_name: String,
    pub files_count: usize,
    pub files: Vec<UploadedFileDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadedFileDto {
    pub file_id: Uuid,
    /// Original file name
    pub file_name: String,
    pub size: i64,
    pub mime_type: String,
    /// API path serving the file bytes
    pub url: String,
}

/// Optional session token for downloads when owner-only access is configured
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Session token, used when no `Authorization` header can be sent
    pub token: Option<String>,
}

/// Allowed MIME types for file uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Maximum file size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Maximum number of files in one upload request
pub const MAX_FILES_PER_UPLOAD: usize = 6;

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Content type served for a downloaded file, from its original name
pub fn content_type_for_name(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        _ => "application/octet-stream",
    }
}
