use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a collection (one named upload batch of a user)
#[derive(Debug, Clone, FromRow)]
pub struct Collection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub collection_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Collection row joined with its computed file count
#[derive(Debug, Clone, FromRow)]
pub struct CollectionWithCount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub collection_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub file_count: i64,
}
