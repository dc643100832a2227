use std::sync::Arc;
use tracing::info;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{AuthUserDto, LogoutAllResponseDto, SessionResponseDto};
use crate::features::auth::jwt::TokenSigner;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::models::{User, UserRole};
use crate::features::auth::password::{hash_password, verify_password};
use crate::features::auth::repositories::AuthRepository;
use crate::shared::validation::is_blank;

/// Service for account and session operations
pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    signer: TokenSigner,
    admin_registration_secret: Option<String>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, config: &AuthConfig) -> Self {
        Self {
            repo,
            signer: TokenSigner::new(&config.jwt_secret),
            admin_registration_secret: config.admin_registration_secret.clone(),
        }
    }

    /// Create an account with `role` and open its first session
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<SessionResponseDto> {
        if is_blank(email) || is_blank(password) {
            return Err(AppError::Validation("All fields are required".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = self.repo.create_user(email, &password_hash, role).await?;
        info!("Registered user {} as {}", user.id, user.role);

        self.open_session(&user, "Welcome user").await
    }

    /// Register an Admin account, gated by the admin registration secret
    pub async fn register_admin(
        &self,
        email: &str,
        password: &str,
        admin_secret: &str,
    ) -> Result<SessionResponseDto> {
        match &self.admin_registration_secret {
            Some(expected) if expected == admin_secret => {}
            _ => {
                return Err(AppError::Forbidden(
                    "Invalid admin registration secret".to_string(),
                ))
            }
        }

        self.register(email, password, UserRole::Admin).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionResponseDto> {
        if is_blank(email) || is_blank(password) {
            return Err(AppError::Validation(
                "password and email are required".to_string(),
            ));
        }

        let user = self
            .repo
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        if user.suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }

        self.open_session(&user, "Welcome back").await
    }

    async fn open_session(&self, user: &User, message: &str) -> Result<SessionResponseDto> {
        let token = self.signer.issue(user.id, user.role)?;
        self.repo.insert_token(user.id, &token).await?;

        Ok(SessionResponseDto {
            success: true,
            message: message.to_string(),
            token,
            role: user.role,
        })
    }

    /// Resolve a session token to its principal
    ///
    /// The signature must verify and the token must be stored and unrevoked.
    pub async fn validate(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.signer.verify(token)?;

        let user = self
            .repo
            .find_user_by_active_token(token)
            .await?
            .filter(|user| user.id == claims.sub)
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        if user.suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }

        Ok(AuthenticatedUser::from_user(user, token))
    }

    /// Revoke a single session token
    pub async fn logout(&self, token: &str) -> Result<()> {
        if !self.repo.revoke_token(token).await? {
            return Err(AppError::NotFound("Token not found".to_string()));
        }
        Ok(())
    }

    /// Revoke every active session of the token's owner
    pub async fn logout_all(&self, token: &str) -> Result<LogoutAllResponseDto> {
        let user = self
            .repo
            .find_user_by_active_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Token not found".to_string()))?;

        let revoked_sessions = self.repo.revoke_all_tokens(user.id).await?;
        info!("Revoked {} sessions of user {}", revoked_sessions, user.id);

        Ok(LogoutAllResponseDto { revoked_sessions })
    }

    pub async fn upgrade_user_to_admin(
        &self,
        target_email: &str,
        caller_token: &str,
    ) -> Result<AuthUserDto> {
        let only_admins =
            || AppError::Forbidden("Only admins can upgrade users to admin role".to_string());

        let caller = self.validate(caller_token).await.map_err(|_| only_admins())?;
        if !caller.is_admin() {
            return Err(only_admins());
        }

        let user = self
            .repo
            .set_role_by_email(target_email, UserRole::Admin)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        info!("User {} upgraded to Admin by {}", user.id, caller.user_id);

        Ok(user.into())
    }

    /// Get current user info (for /me endpoint)
    pub fn me(&self, user: AuthenticatedUser) -> AuthUserDto {
        user.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{auth_service, MemoryStore};

    #[tokio::test]
    async fn test_register_then_login_yields_valid_tokens() {
        let service = auth_service(Arc::new(MemoryStore::default()));

        let registered = service
            .register("a@x.com", "secret123", UserRole::Student)
            .await
            .unwrap();
        assert!(registered.success);
        assert_eq!(registered.role, UserRole::Student);

        let logged_in = service.login("a@x.com", "secret123").await.unwrap();
        assert_ne!(registered.token, logged_in.token);

        // The older session stays valid until revoked
        let first = service.validate(&registered.token).await.unwrap();
        let second = service.validate(&logged_in.token).await.unwrap();
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(first.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_register_rejects_blank_and_duplicate() {
        let service = auth_service(Arc::new(MemoryStore::default()));

        let err = service
            .register("  ", "secret123", UserRole::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        service
            .register("a@x.com", "secret123", UserRole::Student)
            .await
            .unwrap();
        let err = service
            .register("a@x.com", "other", UserRole::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let service = auth_service(Arc::new(MemoryStore::default()));
        service
            .register("a@x.com", "secret123", UserRole::Student)
            .await
            .unwrap();

        let err = service.login("a@x.com", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        let err = service.login("b@x.com", "secret123").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_logout_revokes_only_that_token() {
        let service = auth_service(Arc::new(MemoryStore::default()));
        let first = service
            .register("a@x.com", "secret123", UserRole::Student)
            .await
            .unwrap();
        let second = service.login("a@x.com", "secret123").await.unwrap();

        service.logout(&first.token).await.unwrap();

        let err = service.validate(&first.token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(service.validate(&second.token).await.is_ok());

        let err = service.logout(&first.token).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_logout_all_revokes_every_session() {
        let service = auth_service(Arc::new(MemoryStore::default()));
        service
            .register("a@x.com", "secret123", UserRole::Student)
            .await
            .unwrap();

        let mut tokens = Vec::new();
        for _ in 0..3 {
            tokens.push(service.login("a@x.com", "secret123").await.unwrap().token);
        }

        // Registration opened one session too
        let result = service.logout_all(&tokens[0]).await.unwrap();
        assert_eq!(result.revoked_sessions, 4);

        for token in &tokens {
            assert!(service.validate(token).await.is_err());
        }

        let err = service.logout_all(&tokens[0]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_register_admin_requires_secret() {
        let service = auth_service(Arc::new(MemoryStore::default()));

        let err = service
            .register_admin("boss@x.com", "secret123", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let session = service
            .register_admin("boss@x.com", "secret123", "let-me-in")
            .await
            .unwrap();
        assert_eq!(session.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_upgrade_user_to_admin() {
        let service = auth_service(Arc::new(MemoryStore::default()));
        let student = service
            .register("a@x.com", "secret123", UserRole::Student)
            .await
            .unwrap();
        let admin = service
            .register("boss@x.com", "secret123", UserRole::Admin)
            .await
            .unwrap();

        let err = service
            .upgrade_user_to_admin("boss@x.com", &student.token)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service
            .upgrade_user_to_admin("ghost@x.com", &admin.token)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let upgraded = service
            .upgrade_user_to_admin("a@x.com", &admin.token)
            .await
            .unwrap();
        assert_eq!(upgraded.role, UserRole::Admin);
    }
}
