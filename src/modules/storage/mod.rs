//! Storage module for uploaded file bytes
//!
//! Files live either on local disk or in a MinIO/S3-compatible bucket.
//! [`StorageService`] picks the backend for new uploads and dispatches reads
//! and deletes on the shape of the stored location, so rows written under a
//! previous backend stay readable.

mod local_storage;
mod minio_client;
mod object_store;
mod storage_service;

pub use local_storage::LocalStorage;
pub use minio_client::MinIOClient;
pub use object_store::ObjectStore;
pub use storage_service::{is_remote_location, StorageBackend, StorageService, StoredFile};
