use axum::{
    body::Body,
    extract::{multipart::Field, multipart::MultipartError, Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppPath;
use crate::core::middleware::bearer_token;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    content_type_for_name, DownloadQuery, UploadFilesDto, UploadResultDto, MAX_FILES_PER_UPLOAD,
    MAX_FILE_SIZE,
};
use crate::features::files::models::{FileDownload, IncomingFile};
use crate::features::files::services::FileService;
use crate::shared::types::ApiResponse;

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body too large".to_string())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    }
}

/// Read one file part, stopping as soon as it passes the size limit
async fn read_file_field(mut field: Field<'_>) -> Result<IncomingFile> {
    let original_name = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unnamed".to_string());
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > MAX_FILE_SIZE {
            return Err(AppError::PayloadTooLarge(format!(
                "File '{}' exceeds the {}MB limit",
                original_name,
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(IncomingFile {
        original_name,
        content_type,
        data,
    })
}

/// Upload files into a collection
///
/// Accepts multipart/form-data with:
/// - `collection_name`: target collection, created on first use
/// - `files`: up to 6 files of at most 10MB each (PDF, JPEG, PNG, WEBP, DOCX, XLSX, PPTX)
#[utoipa::path(
    post,
    path = "/api/upload-multiple",
    tag = "files",
    request_body(
        content = UploadFilesDto,
        content_type = "multipart/form-data",
        description = "Collection name and up to 6 files",
    ),
    responses(
        (status = 201, description = "Files uploaded successfully", body = ApiResponse<UploadResultDto>),
        (status = 400, description = "Missing collection name, no files or file type not allowed"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large or too many files")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_multiple(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResultDto>>)> {
    let mut collection_name = String::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "files" | "file" => {
                if files.len() == MAX_FILES_PER_UPLOAD {
                    return Err(AppError::PayloadTooLarge(format!(
                        "At most {} files can be uploaded at once",
                        MAX_FILES_PER_UPLOAD
                    )));
                }
                files.push(read_file_field(field).await?);
            }
            "collection_name" => {
                collection_name = field.text().await.map_err(multipart_error)?;
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let result = service
        .upload(user.user_id, &collection_name, files)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(result),
            Some("Files uploaded successfully".to_string()),
            None,
        )),
    ))
}

/// Download a single file
///
/// Files in object storage answer with a redirect to a time-limited URL;
/// local files are streamed.
#[utoipa::path(
    get,
    path = "/api/download/{file_id}",
    tag = "files",
    params(
        ("file_id" = Uuid, Path, description = "File ID"),
        DownloadQuery
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 307, description = "Redirect to the stored object"),
        (status = 401, description = "Token required for owner-only downloads"),
        (status = 403, description = "Caller does not own the file"),
        (status = 404, description = "File not found")
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn download_file(
    State(service): State<Arc<FileService>>,
    AppPath(file_id): AppPath<Uuid>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let token = bearer_token(&headers).or(query.token.as_deref());

    match service.prepare_download(file_id, token).await? {
        FileDownload::Redirect(url) => Ok(Redirect::temporary(&url).into_response()),
        FileDownload::Local {
            file,
            len,
            original_name,
        } => {
            let stream = ReaderStream::new(file);
            Ok((
                [
                    (
                        header::CONTENT_TYPE,
                        content_type_for_name(&original_name).to_string(),
                    ),
                    (header::CONTENT_DISPOSITION, attachment(&original_name)),
                    (header::CONTENT_LENGTH, len.to_string()),
                    (header::CACHE_CONTROL, "no-cache".to_string()),
                ],
                Body::from_stream(stream),
            )
                .into_response())
        }
    }
}

/// Download every file of a collection as a ZIP archive
///
/// The archive is streamed back; files that cannot be read are left out.
#[utoipa::path(
    get,
    path = "/api/download-collection/{id}/zip",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "Collection ID"),
        DownloadQuery
    ),
    responses(
        (status = 200, description = "ZIP archive", content_type = "application/zip"),
        (status = 401, description = "Token required for owner-only downloads"),
        (status = 403, description = "Caller does not own the collection"),
        (status = 404, description = "Collection not found or empty")
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn download_collection_zip(
    State(service): State<Arc<FileService>>,
    AppPath(id): AppPath<Uuid>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let token = bearer_token(&headers).or(query.token.as_deref());
    let archive = service.collection_archive(id, token).await?;

    let stream = ReaderStream::new(archive.file);
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&archive.file_name)),
            (header::CONTENT_LENGTH, archive.len.to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

fn attachment(file_name: &str) -> String {
    format!(
        "attachment; filename=\"{}\"",
        urlencoding::encode(file_name)
    )
}
