use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::modules::storage::{LocalStorage, ObjectStore};

/// Where newly uploaded bytes are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    Remote,
}

/// Outcome of storing one uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Generated, collision-resistant name (`<uuid>.<ext>`)
    pub file_name: String,
    /// Local path or object URL, persisted as the file location
    pub location: String,
}

/// Object URLs are absolute http(s) URLs; anything else is a local path.
pub fn is_remote_location(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Storage adapter shared by upload, download and delete paths
pub struct StorageService {
    backend: StorageBackend,
    local: LocalStorage,
    remote: Option<Arc<dyn ObjectStore>>,
}

impl StorageService {
    pub fn new(
        backend: StorageBackend,
        local: LocalStorage,
        remote: Option<Arc<dyn ObjectStore>>,
    ) -> Result<Self> {
        if backend == StorageBackend::Remote && remote.is_none() {
            return Err(AppError::Internal(
                "Remote storage backend selected without an object store".to_string(),
            ));
        }

        Ok(Self {
            backend,
            local,
            remote,
        })
    }

    fn remote(&self) -> Result<&Arc<dyn ObjectStore>> {
        self.remote
            .as_ref()
            .ok_or_else(|| AppError::Storage("No object store configured".to_string()))
    }

    /// Persist one uploaded file for `owner` on the active backend
    pub async fn store(
        &self,
        owner: Uuid,
        original_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredFile> {
        let file_name = generate_file_name(original_name);

        let location = match self.backend {
            StorageBackend::Local => self.local.write(&file_name, &data).await?,
            StorageBackend::Remote => {
                let remote = self.remote()?;
                let key = format!("{}/{}/{}", remote.upload_prefix(), owner, file_name);
                remote.put(&key, data, content_type).await?
            }
        };

        debug!("Stored '{}' as {}", original_name, location);
        Ok(StoredFile {
            file_name,
            location,
        })
    }

    /// Blocking reader over a stored file
    ///
    /// Local files are read from disk as the caller consumes them; remote
    /// objects are fetched into memory first.
    pub async fn open_reader(&self, location: &str) -> Result<Box<dyn Read + Send>> {
        if is_remote_location(location) {
            let data = self.remote()?.get(location).await?;
            Ok(Box::new(Cursor::new(data)))
        } else {
            let (file, _) = self.local.open(location).await?;
            Ok(Box::new(file.into_std().await))
        }
    }

    /// Open a local file for streaming
    pub async fn open_local(&self, location: &str) -> Result<(File, u64)> {
        self.local.open(location).await
    }

    pub async fn delete(&self, location: &str) -> Result<()> {
        if is_remote_location(location) {
            self.remote()?.remove(location).await
        } else {
            self.local.remove(location).await
        }
    }

    /// Delete stored bytes, logging instead of failing
    pub async fn delete_best_effort(&self, location: &str) {
        if let Err(e) = self.delete(location).await {
            warn!("Failed to delete stored file {}: {}", location, e);
        }
    }

    /// URL a client is redirected to for a remote object
    pub async fn download_url(&self, location: &str) -> Result<String> {
        self.remote()?.access_url(location).await
    }
}

/// `<uuid>.<ext>`, keeping the lowercased extension of the original name
fn generate_file_name(original_name: &str) -> String {
    let id = Uuid::new_v4();
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}
