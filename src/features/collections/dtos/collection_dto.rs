use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::collections::models::{Collection, CollectionWithCount, FileMetadata};

/// Collection summary as listed
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CollectionResponseDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub collection_name: String,
    pub file_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CollectionWithCount> for CollectionResponseDto {
    fn from(c: CollectionWithCount) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            collection_name: c.collection_name,
            file_count: c.file_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Collection with its files, most recently uploaded first
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CollectionDetailDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub collection_name: String,
    pub file_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub files: Vec<FileResponseDto>,
}

impl CollectionDetailDto {
    pub fn new(collection: Collection, files: Vec<FileMetadata>) -> Self {
        Self {
            id: collection.id,
            user_id: collection.user_id,
            collection_name: collection.collection_name,
            file_count: files.len() as i64,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
            files: files.into_iter().map(FileResponseDto::from).collect(),
        }
    }
}

/// Collection after a rename
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CollectionDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub collection_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Collection> for CollectionDto {
    fn from(c: Collection) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            collection_name: c.collection_name,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub file_name: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    /// API path serving the file bytes
    pub download_url: String,
}

impl From<FileMetadata> for FileResponseDto {
    fn from(f: FileMetadata) -> Self {
        Self {
            download_url: download_path(f.id),
            id: f.id,
            collection_id: f.collection_id,
            file_name: f.file_name,
            original_name: f.original_name,
            file_size: f.file_size,
            mime_type: f.mime_type,
            uploaded_at: f.uploaded_at,
        }
    }
}

/// Path of the single-file download endpoint
pub fn download_path(file_id: Uuid) -> String {
    format!("/api/download/{}", file_id)
}

/// Longest accepted collection name, in characters
pub const MAX_COLLECTION_NAME_LENGTH: usize = 255;

/// Request DTO for renaming a collection
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RenameCollectionDto {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Collection name must be 1-255 characters"))]
    pub collection_name: String,
}
