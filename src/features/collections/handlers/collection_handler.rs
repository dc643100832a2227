use axum::{extract::State, Json};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath};
use crate::features::collections::dtos::{
    CollectionDetailDto, CollectionDto, CollectionResponseDto, FileResponseDto,
    RenameCollectionDto,
};
use crate::features::collections::services::CollectionService;
use crate::shared::types::{ApiResponse, Meta};

/// List all collections
#[utoipa::path(
    get,
    path = "/api/collections",
    responses(
        (status = 200, description = "Collections retrieved", body = ApiResponse<Vec<CollectionResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    tag = "collections",
    security(("bearer_auth" = []))
)]
pub async fn list_collections(
    State(service): State<Arc<CollectionService>>,
) -> Result<Json<ApiResponse<Vec<CollectionResponseDto>>>> {
    let collections = service.list_collections().await?;
    let total = collections.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(collections),
        None,
        Some(Meta { total }),
    )))
}

/// Get a collection with its files
#[utoipa::path(
    get,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Collection retrieved", body = ApiResponse<CollectionDetailDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Collection not found")
    ),
    tag = "collections",
    security(("bearer_auth" = []))
)]
pub async fn get_collection(
    State(service): State<Arc<CollectionService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<CollectionDetailDto>>> {
    let collection = service.get_collection(id).await?;
    Ok(Json(ApiResponse::success(Some(collection), None, None)))
}

/// List the files of a collection
#[utoipa::path(
    get,
    path = "/api/collections/{id}/files",
    params(("id" = Uuid, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Files retrieved", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Collection not found")
    ),
    tag = "collections",
    security(("bearer_auth" = []))
)]
pub async fn get_collection_files(
    State(service): State<Arc<CollectionService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    let files = service.get_collection_files(id).await?;
    let total = files.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

/// Rename a collection
#[utoipa::path(
    put,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection ID")),
    request_body = RenameCollectionDto,
    responses(
        (status = 200, description = "Collection updated", body = ApiResponse<CollectionDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Collection not found"),
        (status = 409, description = "Owner already has a collection with this name")
    ),
    tag = "collections",
    security(("bearer_auth" = []))
)]
pub async fn rename_collection(
    State(service): State<Arc<CollectionService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<RenameCollectionDto>,
) -> Result<Json<ApiResponse<CollectionDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let collection = service.rename_collection(id, &dto.collection_name).await?;
    Ok(Json(ApiResponse::success(
        Some(collection),
        Some("Collection updated successfully".to_string()),
        None,
    )))
}

/// Delete a collection and its files
#[utoipa::path(
    delete,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Collection deleted"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Collection not found")
    ),
    tag = "collections",
    security(("bearer_auth" = []))
)]
pub async fn delete_collection(
    State(service): State<Arc<CollectionService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_collection(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Collection deleted successfully".to_string()),
        None,
    )))
}

/// Delete one file
#[utoipa::path(
    delete,
    path = "/api/files/{file_id}",
    params(("file_id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "File deleted"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    tag = "collections",
    security(("bearer_auth" = []))
)]
pub async fn delete_file(
    State(service): State<Arc<CollectionService>>,
    AppPath(file_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_file(file_id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("File deleted successfully".to_string()),
        None,
    )))
}
