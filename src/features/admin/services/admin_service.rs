use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::*;
use crate::features::admin::repositories::AdminRepository;
use crate::modules::storage::StorageService;

/// Service for admin queries and account maintenance
pub struct AdminService {
    repo: Arc<dyn AdminRepository>,
    storage: Arc<StorageService>,
}

impl AdminService {
    pub fn new(repo: Arc<dyn AdminRepository>, storage: Arc<StorageService>) -> Self {
        Self { repo, storage }
    }

    pub async fn list_users(&self) -> Result<Vec<AdminUserDto>> {
        let users = self.repo.list_users_with_counts().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    pub async fn list_collections(&self) -> Result<Vec<AdminCollectionDto>> {
        let collections = self.repo.list_collections_with_owner().await?;
        Ok(collections.into_iter().map(Into::into).collect())
    }

    /// Delete a user with everything they own
    ///
    /// Stored bytes are removed best-effort before the rows cascade away.
    pub async fn delete_user(&self, caller_id: Uuid, user_id: Uuid) -> Result<()> {
        if caller_id == user_id {
            return Err(AppError::Validation(
                "Cannot delete your own account".to_string(),
            ));
        }

        if self.repo.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let locations = self.repo.user_file_locations(user_id).await?;
        for location in &locations {
            self.storage.delete_best_effort(location).await;
        }

        self.repo.delete_user(user_id).await?;
        info!(
            "User {} deleted by {} with {} stored files",
            user_id,
            caller_id,
            locations.len()
        );
        Ok(())
    }

    pub async fn set_user_suspended(
        &self,
        caller_id: Uuid,
        user_id: Uuid,
        suspended: bool,
    ) -> Result<UserStatusDto> {
        if caller_id == user_id {
            return Err(AppError::Validation(
                "Cannot change the suspension of your own account".to_string(),
            ));
        }

        let user = self
            .repo
            .set_suspended(user_id, suspended)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        info!(
            "User {} {} by {}",
            user_id,
            if suspended { "suspended" } else { "reinstated" },
            caller_id
        );

        Ok(user.into())
    }
}
