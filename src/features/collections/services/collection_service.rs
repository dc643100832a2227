use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::collections::dtos::{
    CollectionDetailDto, CollectionDto, CollectionResponseDto, FileResponseDto,
    MAX_COLLECTION_NAME_LENGTH,
};
use crate::features::collections::repositories::CollectionRepository;
use crate::modules::storage::StorageService;
use crate::shared::validation::is_blank;

/// Browsing and maintenance of collections and their files
pub struct CollectionService {
    repo: Arc<dyn CollectionRepository>,
    storage: Arc<StorageService>,
}

impl CollectionService {
    pub fn new(repo: Arc<dyn CollectionRepository>, storage: Arc<StorageService>) -> Self {
        Self { repo, storage }
    }

    pub async fn list_collections(&self) -> Result<Vec<CollectionResponseDto>> {
        let collections = self.repo.list_with_counts().await?;
        Ok(collections.into_iter().map(Into::into).collect())
    }

    pub async fn get_collection(&self, id: Uuid) -> Result<CollectionDetailDto> {
        let collection = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))?;
        let files = self.repo.list_files(id).await?;

        Ok(CollectionDetailDto::new(collection, files))
    }

    pub async fn get_collection_files(&self, id: Uuid) -> Result<Vec<FileResponseDto>> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Collection not found".to_string()));
        }

        let files = self.repo.list_files(id).await?;
        Ok(files.into_iter().map(Into::into).collect())
    }

    pub async fn rename_collection(&self, id: Uuid, new_name: &str) -> Result<CollectionDto> {
        if is_blank(new_name) {
            return Err(AppError::Validation(
                "Collection name cannot be empty".to_string(),
            ));
        }
        if new_name.chars().count() > MAX_COLLECTION_NAME_LENGTH {
            return Err(AppError::Validation(format!(
                "Collection name must be at most {} characters",
                MAX_COLLECTION_NAME_LENGTH
            )));
        }

        let collection = self
            .repo
            .rename(id, new_name)
            .await?
            .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))?;
        info!("Collection {} renamed to '{}'", id, collection.collection_name);

        Ok(collection.into())
    }

    /// Delete a collection, its file rows and, best-effort, the stored bytes
    pub async fn delete_collection(&self, id: Uuid) -> Result<()> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Collection not found".to_string()));
        }

        let files = self.repo.list_files(id).await?;
        for file in &files {
            self.storage.delete_best_effort(&file.file_path).await;
        }

        self.repo.delete(id).await?;
        info!("Collection {} deleted with {} files", id, files.len());
        Ok(())
    }

    pub async fn delete_file(&self, file_id: Uuid) -> Result<()> {
        let file = self
            .repo
            .find_file(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        self.storage.delete_best_effort(&file.file_path).await;
        self.repo.delete_file(file_id).await?;
        info!("File {} deleted from collection {}", file_id, file.collection_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::collections::models::NewFileMetadata;
    use crate::shared::test_helpers::{local_storage, MemoryStore};

    fn new_file(path: &str) -> NewFileMetadata {
        NewFileMetadata {
            file_name: "stored.pdf".to_string(),
            original_name: "notes.pdf".to_string(),
            file_path: path.to_string(),
            file_size: 3,
            mime_type: "application/pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_per_owner() {
        let store = Arc::new(MemoryStore::default());
        let alice = store.add_user("alice@x.com").await;
        let bob = store.add_user("bob@x.com").await;

        let first = store.get_or_create(alice, "Homework").await.unwrap();
        let again = store.get_or_create(alice, "Homework").await.unwrap();
        let other = store.get_or_create(bob, "Homework").await.unwrap();

        assert_eq!(first.id, again.id);
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn test_list_and_get_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::default());
        let service = CollectionService::new(store.clone(), local_storage(dir.path()));

        let owner = store.add_user("alice@x.com").await;
        let collection = store.get_or_create(owner, "Homework").await.unwrap();
        store.get_or_create(owner, "Empty").await.unwrap();
        store
            .insert_files(collection.id, &[new_file("a"), new_file("b")])
            .await
            .unwrap();

        let listed = service.list_collections().await.unwrap();
        assert_eq!(listed.len(), 2);
        let homework = listed.iter().find(|c| c.id == collection.id).unwrap();
        assert_eq!(homework.file_count, 2);

        let detail = service.get_collection(collection.id).await.unwrap();
        assert_eq!(detail.file_count, 2);
        assert_eq!(detail.files.len(), 2);
        assert!(detail.files[0].download_url.starts_with("/api/download/"));

        let err = service.get_collection(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = service
            .get_collection_files(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rename_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::default());
        let service = CollectionService::new(store.clone(), local_storage(dir.path()));

        let owner = store.add_user("alice@x.com").await;
        let homework = store.get_or_create(owner, "Homework").await.unwrap();
        store.get_or_create(owner, "Projects").await.unwrap();

        let err = service
            .rename_collection(homework.id, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service
            .rename_collection(homework.id, &"n".repeat(MAX_COLLECTION_NAME_LENGTH + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service
            .rename_collection(homework.id, "Projects")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = service
            .rename_collection(Uuid::new_v4(), "Anything")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let renamed = service
            .rename_collection(homework.id, "Term 1")
            .await
            .unwrap();
        assert_eq!(renamed.collection_name, "Term 1");
    }

    #[tokio::test]
    async fn test_delete_collection_removes_rows_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::default());
        let storage = local_storage(dir.path());
        let service = CollectionService::new(store.clone(), storage.clone());

        let owner = store.add_user("alice@x.com").await;
        let stored = storage
            .store(owner, "notes.pdf", "application/pdf", b"pdf".to_vec())
            .await
            .unwrap();
        let collection = store.get_or_create(owner, "Homework").await.unwrap();
        store
            .insert_files(
                collection.id,
                &[new_file(&stored.location), new_file("missing/on/disk.pdf")],
            )
            .await
            .unwrap();

        service.delete_collection(collection.id).await.unwrap();

        assert!(store.find_by_id(collection.id).await.unwrap().is_none());
        assert!(store.list_files(collection.id).await.unwrap().is_empty());
        assert!(!std::path::Path::new(&stored.location).exists());

        let err = service.delete_collection(collection.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::default());
        let service = CollectionService::new(store.clone(), local_storage(dir.path()));

        let owner = store.add_user("alice@x.com").await;
        let collection = store.get_or_create(owner, "Homework").await.unwrap();
        let files = store
            .insert_files(collection.id, &[new_file("a"), new_file("b")])
            .await
            .unwrap();

        service.delete_file(files[0].id).await.unwrap();
        assert_eq!(store.list_files(collection.id).await.unwrap().len(), 1);

        let err = service.delete_file(files[0].id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
