use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::config::DownloadAccess;
use crate::core::error::{AppError, Result};
use crate::features::auth::services::AuthService;
use crate::features::collections::dtos::{download_path, MAX_COLLECTION_NAME_LENGTH};
use crate::features::collections::models::NewFileMetadata;
use crate::features::collections::repositories::CollectionRepository;
use crate::features::files::archive::ArchiveWriter;
use crate::features::files::dtos::{
    is_mime_type_allowed, UploadResultDto, UploadedFileDto, MAX_FILES_PER_UPLOAD, MAX_FILE_SIZE,
};
use crate::features::files::models::{CollectionArchive, FileDownload, IncomingFile};
use crate::modules::storage::{is_remote_location, StorageService};
use crate::shared::validation::{is_blank, sanitize_archive_name};

/// Upload and download pipelines
pub struct FileService {
    collections: Arc<dyn CollectionRepository>,
    storage: Arc<StorageService>,
    auth: Arc<AuthService>,
    download_access: DownloadAccess,
}

impl FileService {
    pub fn new(
        collections: Arc<dyn CollectionRepository>,
        storage: Arc<StorageService>,
        auth: Arc<AuthService>,
        download_access: DownloadAccess,
    ) -> Self {
        Self {
            collections,
            storage,
            auth,
            download_access,
        }
    }

    /// Store `files` under the caller's collection named `collection_name`
    ///
    /// On any failure the bytes already stored by this call are removed again.
    pub async fn upload(
        &self,
        user_id: Uuid,
        collection_name: &str,
        files: Vec<IncomingFile>,
    ) -> Result<UploadResultDto> {
        if is_blank(collection_name) {
            return Err(AppError::Validation(
                "Collection name is required".to_string(),
            ));
        }
        if collection_name.chars().count() > MAX_COLLECTION_NAME_LENGTH {
            return Err(AppError::Validation(format!(
                "Collection name must be at most {} characters",
                MAX_COLLECTION_NAME_LENGTH
            )));
        }
        if files.is_empty() {
            return Err(AppError::Validation("No files provided".to_string()));
        }
        validate_files(&files)?;

        let collection = self
            .collections
            .get_or_create(user_id, collection_name)
            .await?;

        let mut stored_locations = Vec::with_capacity(files.len());
        let mut rows = Vec::with_capacity(files.len());
        for file in files {
            let file_size = file.data.len() as i64;
            match self
                .storage
                .store(user_id, &file.original_name, &file.content_type, file.data)
                .await
            {
                Ok(stored) => {
                    stored_locations.push(stored.location.clone());
                    rows.push(NewFileMetadata {
                        file_name: stored.file_name,
                        original_name: file.original_name,
                        file_path: stored.location,
                        file_size,
                        mime_type: file.content_type,
                    });
                }
                Err(e) => {
                    self.discard(&stored_locations).await;
                    return Err(e);
                }
            }
        }

        let inserted = match self.collections.insert_files(collection.id, &rows).await {
            Ok(inserted) => inserted,
            Err(e) => {
                self.discard(&stored_locations).await;
                return Err(e);
            }
        };

        info!(
            "User {} uploaded {} files to collection {}",
            user_id,
            inserted.len(),
            collection.id
        );

        let files: Vec<UploadedFileDto> = inserted
            .into_iter()
            .map(|row| UploadedFileDto {
                url: download_path(row.id),
                file_id: row.id,
                file_name: row.original_name,
                size: row.file_size,
                mime_type: row.mime_type,
            })
            .collect();

        Ok(UploadResultDto {
            collection_id: collection.id,
            collection_name: collection.collection_name,
            files_count: files.len(),
            files,
        })
    }

    async fn discard(&self, locations: &[String]) {
        if !locations.is_empty() {
            warn!("Upload failed, removing {} stored files", locations.len());
        }
        for location in locations {
            self.storage.delete_best_effort(location).await;
        }
    }

    /// Apply the download access policy for a resource owned by `owner`
    async fn authorize(&self, token: Option<&str>, owner: Uuid) -> Result<()> {
        if self.download_access == DownloadAccess::Public {
            return Ok(());
        }

        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;
        let user = self.auth.validate(token).await?;

        if user.user_id != owner {
            return Err(AppError::Forbidden(
                "You do not have access to this file".to_string(),
            ));
        }
        Ok(())
    }

    async fn collection_owner(&self, collection_id: Uuid) -> Result<Uuid> {
        self.collections
            .find_by_id(collection_id)
            .await?
            .map(|c| c.user_id)
            .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))
    }

    /// Resolve how a single file is served
    pub async fn prepare_download(
        &self,
        file_id: Uuid,
        token: Option<&str>,
    ) -> Result<FileDownload> {
        let file = self
            .collections
            .find_file(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let owner = self.collection_owner(file.collection_id).await?;
        self.authorize(token, owner).await?;

        if is_remote_location(&file.file_path) {
            let url = self.storage.download_url(&file.file_path).await?;
            return Ok(FileDownload::Redirect(url));
        }

        let (handle, len) = self.storage.open_local(&file.file_path).await?;
        Ok(FileDownload::Local {
            file: handle,
            len,
            original_name: file.original_name,
        })
    }

    /// Build a ZIP of every readable file of a collection
    ///
    /// Entries are added one file at a time. Files that cannot be read are
    /// logged and left out of the archive.
    pub async fn collection_archive(
        &self,
        collection_id: Uuid,
        token: Option<&str>,
    ) -> Result<CollectionArchive> {
        let collection = self
            .collections
            .find_by_id(collection_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))?;
        self.authorize(token, collection.user_id).await?;

        let files = self.collections.list_files(collection_id).await?;
        if files.is_empty() {
            return Err(AppError::NotFound(
                "No files found in collection".to_string(),
            ));
        }

        let mut writer = blocking(ArchiveWriter::new).await?;
        for file in &files {
            let mut source = match self.storage.open_reader(&file.file_path).await {
                Ok(source) => source,
                Err(e) => {
                    warn!(
                        "Skipping file {} in archive of collection {}: {}",
                        file.id, collection_id, e
                    );
                    continue;
                }
            };

            let name = file.original_name.clone();
            let (returned, added) = blocking(move || {
                let added = writer.add(&name, &mut source);
                Ok((writer, added))
            })
            .await?;
            writer = returned;

            if let Err(e) = added {
                warn!(
                    "Skipping file {} in archive of collection {}: {}",
                    file.id, collection_id, e
                );
            }
        }

        let entries = writer.entries();
        let (file, len) = blocking(move || writer.finish()).await?;

        info!(
            "Built archive of collection {} with {}/{} files ({} bytes)",
            collection_id,
            entries,
            files.len(),
            len
        );

        Ok(CollectionArchive {
            file_name: format!("{}.zip", sanitize_archive_name(&collection.collection_name)),
            file: tokio::fs::File::from_std(file),
            len,
            entries,
        })
    }
}

/// Run blocking archive work on the blocking pool
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("ZIP task failed: {}", e)))?
}

fn validate_files(files: &[IncomingFile]) -> Result<()> {
    if files.len() > MAX_FILES_PER_UPLOAD {
        return Err(AppError::PayloadTooLarge(format!(
            "At most {} files can be uploaded at once",
            MAX_FILES_PER_UPLOAD
        )));
    }

    for file in files {
        if file.data.len() > MAX_FILE_SIZE {
            return Err(AppError::PayloadTooLarge(format!(
                "File '{}' exceeds the {}MB limit",
                file.original_name,
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }
        if !is_mime_type_allowed(&file.content_type) {
            return Err(AppError::Validation(format!(
                "File type '{}' is not allowed",
                file.content_type
            )));
        }
    }
    Ok(())
}
