use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::auth::models::{User, UserRole};

/// Principal resolved from a valid session token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Session token the request was authenticated with
    #[serde(skip)]
    pub token: String,
}

impl AuthenticatedUser {
    pub fn from_user(user: User, token: impl Into<String>) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            role: user.role,
            token: token.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
