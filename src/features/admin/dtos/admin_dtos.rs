use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::admin::models::{AdminCollectionRow, AdminUserRow};
use crate::features::auth::models::{User, UserRole};

// =============================================================================
// USER DTOs
// =============================================================================

/// User as listed for administrators
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminUserDto {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub suspended: bool,
    pub created_at: DateTime<Utc>,
    pub collections_count: i64,
}

impl From<AdminUserRow> for AdminUserDto {
    fn from(row: AdminUserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            role: row.role,
            suspended: row.suspended,
            created_at: row.created_at,
            collections_count: row.collections_count,
        }
    }
}

/// Request DTO for suspending or reinstating a user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetSuspensionDto {
    pub suspended: bool,
}

/// User account state after a suspension change
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserStatusDto {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub suspended: bool,
}

impl From<User> for UserStatusDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            suspended: user.suspended,
        }
    }
}

// =============================================================================
// COLLECTION DTOs
// =============================================================================

/// Collection as listed for administrators
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminCollectionDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub owner_email: String,
    pub collection_name: String,
    pub file_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AdminCollectionRow> for AdminCollectionDto {
    fn from(row: AdminCollectionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            owner_email: row.owner_email,
            collection_name: row.collection_name,
            file_count: row.file_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
