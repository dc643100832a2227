use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::auth::models::UserRole;

/// User row with the number of collections it owns
#[derive(Debug, Clone, FromRow)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub suspended: bool,
    pub created_at: DateTime<Utc>,
    pub collections_count: i64,
}

/// Collection row with its file count and owner email
#[derive(Debug, Clone, FromRow)]
pub struct AdminCollectionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub owner_email: String,
    pub collection_name: String,
    pub file_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
