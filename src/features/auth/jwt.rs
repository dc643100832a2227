//! Session token signing and signature verification.
//!
//! Tokens are HS256-signed JWTs. They carry no expiry: a token stays usable
//! until its row in the `token` table is revoked, so signature verification is
//! only the first half of validation.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::models::UserRole;

/// Claims embedded in every session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject, the user's id
    pub sub: Uuid,
    pub role: UserRole,
    /// Issued-at time (UTC Unix timestamp)
    pub iat: i64,
    /// Random token id, keeps two tokens issued in the same second distinct
    pub jti: String,
}

pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, user_id: Uuid, role: UserRole) -> Result<String> {
        let claims = Claims {
            sub: user_id,
            role,
            iat: chrono::Utc::now().timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    /// Check the signature and decode the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Session token rejected: {}", e);
                AppError::Unauthorized("Invalid or expired token".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let signer = TokenSigner::new("test-secret-that-is-long-enough-for-hmac");
        let user_id = Uuid::new_v4();

        let token = signer.issue(user_id, UserRole::Admin).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, UserRole::Admin);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_tokens_are_distinct() {
        let signer = TokenSigner::new("secret");
        let user_id = Uuid::new_v4();

        let first = signer.issue(user_id, UserRole::Student).unwrap();
        let second = signer.issue(user_id, UserRole::Student).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_different_secrets_fail() {
        let token = TokenSigner::new("secret-alpha")
            .issue(Uuid::new_v4(), UserRole::Student)
            .unwrap();

        let err = TokenSigner::new("secret-bravo").verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_garbage_token_fails() {
        let signer = TokenSigner::new("secret");
        assert!(signer.verify("not-a-jwt").is_err());
    }
}
