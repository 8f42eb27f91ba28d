// Database repositories for back-office accounts and refresh tokens

use crate::auth::{error::AuthError, models::{AdminUser, RefreshToken, Role}};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

/// Account repository for database operations
#[derive(Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    /// Create a new AdminRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new back-office account
    pub async fn create_user(&self, email: &str, password_hash: &str, role: Role) -> Result<AdminUser, AuthError> {
        let user = sqlx::query_as::<_, AdminUser>(
            "INSERT INTO admin_users (email, password_hash, role) VALUES ($1, $2, $3) RETURNING id, email, password_hash, role, created_at"
        )
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::EmailAlreadyExists;
                }
            }
            AuthError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    /// Find an account by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, AuthError> {
        let user = sqlx::query_as::<_, AdminUser>(
            "SELECT id, email, password_hash, role, created_at FROM admin_users WHERE LOWER(email) = LOWER($1)"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(user)
    }

    /// Find an account by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<AdminUser>, AuthError> {
        let user = sqlx::query_as::<_, AdminUser>(
            "SELECT id, email, password_hash, role, created_at FROM admin_users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(user)
    }
}

/// Token repository for refresh token operations
#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    /// Create a new TokenRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash a token using SHA-256; only the hash is stored at rest
    fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Store a refresh token (hashed)
    pub async fn store_refresh_token(
        &self,
        user_id: i32,
        token: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), AuthError> {
        let token_hash = Self::hash_token(token);

        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)"
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Verify a refresh token exists and is not expired
    pub async fn verify_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
        let token_hash = Self::hash_token(token);

        let refresh_token = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token_hash, expires_at, created_at
             FROM refresh_tokens
             WHERE token_hash = $1 AND expires_at > NOW()"
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(refresh_token)
    }

    /// Invalidate a refresh token
    pub async fn invalidate_token(&self, token: &str) -> Result<(), AuthError> {
        let token_hash = Self::hash_token(token);

        sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Delete expired tokens
    pub async fn delete_expired_tokens(&self) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
