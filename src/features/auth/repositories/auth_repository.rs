use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::models::{SessionToken, User, UserRole};

/// Persistence for users and their session tokens
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Insert a user; `Conflict` if the email is taken
    async fn create_user(&self, email: &str, password_hash: &str, role: UserRole) -> Result<User>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Set the role of the user with `email`, returning the updated row
    async fn set_role_by_email(&self, email: &str, role: UserRole) -> Result<Option<User>>;

    async fn insert_token(&self, user_id: Uuid, token: &str) -> Result<SessionToken>;

    /// Owner of `token` if the token exists and is not revoked
    async fn find_user_by_active_token(&self, token: &str) -> Result<Option<User>>;

    /// Revoke one token; `false` if no unrevoked row matched
    async fn revoke_token(&self, token: &str) -> Result<bool>;

    /// Revoke every unrevoked token of a user, returning how many were revoked
    async fn revoke_all_tokens(&self, user_id: Uuid) -> Result<u64>;
}

pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, role, suspended, created_at, updated_at";

#[async_trait]
impl AuthRepository for PgAuthRepository {
    async fn create_user(&self, email: &str, password_hash: &str, role: UserRole) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Email already registered"))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_role_by_email(&self, email: &str, role: UserRole) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE email = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_token(&self, user_id: Uuid, token: &str) -> Result<SessionToken> {
        let session = sqlx::query_as::<_, SessionToken>(
            r#"
            INSERT INTO token (user_id, token)
            VALUES ($1, $2)
            RETURNING id, user_id, token, created_at, revoked_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    async fn find_user_by_active_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.password_hash, u.role, u.suspended, u.created_at, u.updated_at
            FROM token t
            JOIN users u ON u.id = t.user_id
            WHERE t.token = $1 AND t.revoked_at IS NULL
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn revoke_token(&self, token: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE token SET revoked_at = NOW() WHERE token = $1 AND revoked_at IS NULL",
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_tokens(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE token SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
