use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::collections::models::{
    Collection, CollectionWithCount, FileMetadata, NewFileMetadata,
};

/// Persistence for collections and their file metadata
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Collection named `name` of `user_id`, created if it does not exist yet
    async fn get_or_create(&self, user_id: Uuid, name: &str) -> Result<Collection>;

    /// Every collection with its file count, most recently updated first
    async fn list_with_counts(&self) -> Result<Vec<CollectionWithCount>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Collection>>;

    /// Files of a collection, most recently uploaded first
    async fn list_files(&self, collection_id: Uuid) -> Result<Vec<FileMetadata>>;

    /// Rename a collection; `Conflict` if the owner already uses `name`
    async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Collection>>;

    /// Delete a collection and, by cascade, its file rows
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn find_file(&self, id: Uuid) -> Result<Option<FileMetadata>>;

    async fn delete_file(&self, id: Uuid) -> Result<bool>;

    /// Insert all rows in one transaction and touch the collection
    async fn insert_files(
        &self,
        collection_id: Uuid,
        files: &[NewFileMetadata],
    ) -> Result<Vec<FileMetadata>>;
}

pub struct PgCollectionRepository {
    pool: PgPool,
}

impl PgCollectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLLECTION_COLUMNS: &str = "id, user_id, collection_name, created_at, updated_at";
const FILE_COLUMNS: &str =
    "id, collection_id, file_name, original_name, file_path, file_size, mime_type, uploaded_at";

#[async_trait]
impl CollectionRepository for PgCollectionRepository {
    async fn get_or_create(&self, user_id: Uuid, name: &str) -> Result<Collection> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let collection = sqlx::query_as::<_, Collection>(&format!(
            r#"
            INSERT INTO collections (user_id, collection_name)
            VALUES ($1, $2)
            ON CONFLICT (user_id, collection_name)
            DO UPDATE SET updated_at = NOW()
            RETURNING {}
            "#,
            COLLECTION_COLUMNS
        ))
        .bind(user_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(collection)
    }

    async fn list_with_counts(&self) -> Result<Vec<CollectionWithCount>> {
        let collections = sqlx::query_as::<_, CollectionWithCount>(
            r#"
            SELECT c.id, c.user_id, c.collection_name, c.created_at, c.updated_at,
                   COUNT(fm.id) AS file_count
            FROM collections c
            LEFT JOIN file_metadata fm ON fm.collection_id = c.id
            GROUP BY c.id
            ORDER BY c.updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(collections)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Collection>> {
        let collection = sqlx::query_as::<_, Collection>(&format!(
            "SELECT {} FROM collections WHERE id = $1",
            COLLECTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(collection)
    }

    async fn list_files(&self, collection_id: Uuid) -> Result<Vec<FileMetadata>> {
        let files = sqlx::query_as::<_, FileMetadata>(&format!(
            "SELECT {} FROM file_metadata WHERE collection_id = $1 ORDER BY uploaded_at DESC",
            FILE_COLUMNS
        ))
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Collection>> {
        sqlx::query_as::<_, Collection>(&format!(
            r#"
            UPDATE collections
            SET collection_name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COLLECTION_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_unique_violation(e, "A collection with this name already exists")
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<FileMetadata>> {
        let file = sqlx::query_as::<_, FileMetadata>(&format!(
            "SELECT {} FROM file_metadata WHERE id = $1",
            FILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn delete_file(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM file_metadata WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_files(
        &self,
        collection_id: Uuid,
        files: &[NewFileMetadata],
    ) -> Result<Vec<FileMetadata>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(files.len());

        for file in files {
            let row = sqlx::query_as::<_, FileMetadata>(&format!(
                r#"
                INSERT INTO file_metadata
                    (collection_id, file_name, original_name, file_path, file_size, mime_type)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {}
                "#,
                FILE_COLUMNS
            ))
            .bind(collection_id)
            .bind(&file.file_name)
            .bind(&file.original_name)
            .bind(&file.file_path)
            .bind(file.file_size)
            .bind(&file.mime_type)
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(row);
        }

        sqlx::query("UPDATE collections SET updated_at = NOW() WHERE id = $1")
            .bind(collection_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(inserted)
    }
}
