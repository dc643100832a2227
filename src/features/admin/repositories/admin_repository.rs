use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::admin::models::{AdminCollectionRow, AdminUserRow};
use crate::features::auth::models::User;

/// Cross-user queries and account maintenance for administrators
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Every user with its collection count, newest first
    async fn list_users_with_counts(&self) -> Result<Vec<AdminUserRow>>;

    /// Every collection with file count and owner email, most recently updated first
    async fn list_collections_with_owner(&self) -> Result<Vec<AdminCollectionRow>>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Stored locations of every file in the user's collections
    async fn user_file_locations(&self, user_id: Uuid) -> Result<Vec<String>>;

    /// Delete a user; tokens, collections and file rows go with it
    async fn delete_user(&self, id: Uuid) -> Result<bool>;

    /// Set the suspension flag, revoking all tokens when suspending
    async fn set_suspended(&self, id: Uuid, suspended: bool) -> Result<Option<User>>;
}

pub struct PgAdminRepository {
    pool: PgPool,
}

impl PgAdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, role, suspended, created_at, updated_at";

#[async_trait]
impl AdminRepository for PgAdminRepository {
    async fn list_users_with_counts(&self) -> Result<Vec<AdminUserRow>> {
        let users = sqlx::query_as::<_, AdminUserRow>(
            r#"
            SELECT u.id, u.email, u.role, u.suspended, u.created_at,
                   COUNT(c.id) AS collections_count
            FROM users u
            LEFT JOIN collections c ON c.user_id = u.id
            GROUP BY u.id
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            e
        })?;

        Ok(users)
    }

    async fn list_collections_with_owner(&self) -> Result<Vec<AdminCollectionRow>> {
        let collections = sqlx::query_as::<_, AdminCollectionRow>(
            r#"
            SELECT c.id, c.user_id, u.email AS owner_email, c.collection_name,
                   COUNT(fm.id) AS file_count, c.created_at, c.updated_at
            FROM collections c
            JOIN users u ON u.id = c.user_id
            LEFT JOIN file_metadata fm ON fm.collection_id = c.id
            GROUP BY c.id, u.email
            ORDER BY c.updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list collections: {:?}", e);
            e
        })?;

        Ok(collections)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn user_file_locations(&self, user_id: Uuid) -> Result<Vec<String>> {
        let locations = sqlx::query_scalar::<_, String>(
            r#"
            SELECT fm.file_path
            FROM file_metadata fm
            JOIN collections c ON c.id = fm.collection_id
            WHERE c.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_suspended(&self, id: Uuid, suspended: bool) -> Result<Option<User>> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET suspended = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(suspended)
        .fetch_optional(&mut *tx)
        .await?;

        if user.is_some() && suspended {
            sqlx::query(
                "UPDATE token SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(user)
    }
}
