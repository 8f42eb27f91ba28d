// JWT token generation and validation service

use crate::auth::error::AuthError;
use crate::auth::models::Role;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,        // user_id
    pub email: String,
    pub role: Role,
    pub exp: i64,        // expiration timestamp
    pub iat: i64,        // issued at timestamp
}

/// Token service for JWT operations
pub struct TokenService {
    secret: String,
    access_token_duration: i64,  // in seconds
    refresh_token_duration: i64, // in seconds
}

impl TokenService {
    /// Create a new TokenService with secret key
    /// Access tokens expire in 15 minutes (900 seconds)
    /// Refresh tokens expire in 7 days (604800 seconds)
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            access_token_duration: 900,      // 15 minutes
            refresh_token_duration: 604800,  // 7 days
        }
    }

    /// Generate an access token (15 minutes)
    pub fn generate_access_token(&self, user_id: i32, email: &str, role: Role) -> Result<String, AuthError> {
        self.generate_token(user_id, email, role, self.access_token_duration)
    }

    /// Generate a refresh token (7 days)
    pub fn generate_refresh_token(&self, user_id: i32, email: &str, role: Role) -> Result<String, AuthError> {
        self.generate_token(user_id, email, role, self.refresh_token_duration)
    }

    fn generate_token(&self, user_id: i32, email: &str, role: Role, duration: i64) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role,
            iat: now,
            exp: now + duration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Validate an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token(token)
    }

    /// Validate a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token(token)
    }

    /// Internal helper to validate any token
    fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            if e.to_string().contains("ExpiredSignature") {
                AuthError::ExpiredToken
            } else {
                AuthError::InvalidToken
            }
        })
    }

    /// Generate both access and refresh tokens
    pub fn generate_token_pair(&self, user_id: i32, email: &str, role: Role) -> Result<(String, String), AuthError> {
        let access_token = self.generate_access_token(user_id, email, role)?;
        let refresh_token = self.generate_refresh_token(user_id, email, role)?;
        Ok((access_token, refresh_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Helper to create a test token service
    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string())
    }

    #[test]
    fn test_access_token_expiration_is_15_minutes() {
        let service = test_token_service();
        let token = service.generate_access_token(1, "ops@example.com", Role::Staff).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        let duration = claims.exp - claims.iat;
        assert_eq!(duration, 900, "Access token should expire in exactly 15 minutes");
    }

    #[test]
    fn test_refresh_token_expiration_is_7_days() {
        let service = test_token_service();
        let token = service.generate_refresh_token(1, "ops@example.com", Role::Staff).unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();

        let duration = claims.exp - claims.iat;
        assert_eq!(duration, 604800, "Refresh token should expire in exactly 7 days");
    }

    #[test]
    fn test_token_claims_contain_identity_and_role() {
        let service = test_token_service();

        let token = service.generate_access_token(42, "admin@example.com", Role::Admin).unwrap();
        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_generate_token_pair() {
        let service = test_token_service();
        let (access_token, refresh_token) =
            service.generate_token_pair(1, "ops@example.com", Role::Staff).unwrap();

        assert!(service.validate_access_token(&access_token).is_ok());
        assert!(service.validate_refresh_token(&refresh_token).is_ok());
        assert_ne!(access_token, refresh_token);
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        assert!(service.validate_access_token("").is_err());
        assert!(service.validate_access_token("not.a.token").is_err());
        assert!(service.validate_access_token("invalid_token_format").is_err());
    }

    #[test]
    fn test_token_signature_verification() {
        let service1 = TokenService::new("secret1".to_string());
        let service2 = TokenService::new("secret2".to_string());

        let token = service1.generate_access_token(1, "ops@example.com", Role::Staff).unwrap();

        assert!(service1.validate_access_token(&token).is_ok());
        assert!(service2.validate_access_token(&token).is_err());
    }

    proptest! {
        #[test]
        fn prop_token_claims_roundtrip(
            user_id in 1i32..1000000,
            email in "[a-z]{3,10}@[a-z]{3,10}\\.(com|org|net)"
        ) {
            let service = test_token_service();

            let token = service.generate_access_token(user_id, &email, Role::Staff)?;
            let claims = service.validate_access_token(&token)?;
            prop_assert_eq!(claims.sub, user_id);
            prop_assert_eq!(claims.email, email);
            prop_assert_eq!(claims.role, Role::Staff);
        }

        #[test]
        fn prop_malformed_tokens_rejected(
            malformed in "[a-zA-Z0-9]{10,50}"
        ) {
            let service = test_token_service();

            let result = service.validate_access_token(&malformed);
            prop_assert!(result.is_err());
        }
    }
}
