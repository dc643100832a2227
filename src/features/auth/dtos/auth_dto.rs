use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::models::{User, UserRole};

/// Request DTO for student registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "All fields are required"))]
    pub password: String,
}

/// Request DTO for admin registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAdminRequestDto {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Email, password, and admin secret are required"))]
    pub password: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Email, password, and admin secret are required"))]
    pub admin_secret: String,
}

/// Request DTO for user login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "password and email are required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "password and email are required"))]
    pub password: String,
}

/// Request DTO carrying a session token (logout endpoints)
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct TokenRequestDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Request DTO for promoting a user to admin
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeUserRequestDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and admin token are required"))]
    pub target_user_email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Email and admin token are required"))]
    pub admin_token: String,
}

/// Flat response for endpoints that open a session
///
/// The token sits at the top level rather than inside `data`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponseDto {
    pub success: bool,
    pub message: String,
    /// Signed session token to send as `Authorization: Bearer <token>`
    pub token: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutAllResponseDto {
    /// Number of sessions that were still active and got revoked
    pub revoked_sessions: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for AuthUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

impl From<AuthenticatedUser> for AuthUserDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.user_id,
            email: user.email,
            role: user.role,
        }
    }
}
