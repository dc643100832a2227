use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::File;
use tracing::debug;

use crate::core::error::{AppError, Result};

/// Uploaded files kept in a directory on local disk
///
/// The stored location is the file path as a string, relative paths are
/// resolved against the process working directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the upload directory if it is missing
    pub async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory '{}': {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Write `data` as `file_name` inside the upload directory
    pub async fn write(&self, file_name: &str, data: &[u8]) -> Result<String> {
        let path = self.root.join(file_name);
        tokio::fs::write(&path, data).await.map_err(|e| {
            AppError::Storage(format!("Failed to write '{}': {}", path.display(), e))
        })?;

        debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    /// Open a stored file for streaming, returning it with its length
    pub async fn open(&self, location: &str) -> Result<(File, u64)> {
        let file = File::open(location).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound("File not found on server".to_string()),
            _ => AppError::Storage(format!("Failed to open '{}': {}", location, e)),
        })?;
        let len = file
            .metadata()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to stat '{}': {}", location, e)))?
            .len();

        Ok((file, len))
    }

    /// Remove a stored file; a file that is already gone counts as removed
    pub async fn remove(&self, location: &str) -> Result<()> {
        match tokio::fs::remove_file(location).await {
            Ok(()) => {
                debug!("Removed {}", location);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to remove '{}': {}",
                location, e
            ))),
        }
    }
}
