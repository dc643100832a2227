use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for one stored file. Rows are never updated in place.
#[derive(Debug, Clone, FromRow)]
pub struct FileMetadata {
    pub id: Uuid,
    pub collection_id: Uuid,
    /// Generated storage name
    pub file_name: String,
    /// Name the file was uploaded with
    pub original_name: String,
    /// Local path or object URL
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Values for inserting a file metadata row
#[derive(Debug, Clone)]
pub struct NewFileMetadata {
    pub file_name: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
}
