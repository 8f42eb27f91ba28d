// Authentication service - business logic layer

use chrono::{Duration, Utc};

use crate::auth::{
    error::AuthError,
    models::{AuthResponse, Role, UserResponse},
    password::PasswordService,
    repository::{AdminRepository, TokenRepository},
    token::TokenService,
};

/// Authentication service coordinating all auth operations
pub struct AuthService {
    user_repo: AdminRepository,
    token_repo: TokenRepository,
    token_service: TokenService,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        user_repo: AdminRepository,
        token_repo: TokenRepository,
        token_service: TokenService,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            token_service,
        }
    }

    /// Register a new back-office account
    pub async fn register(&self, email: &str, password: &str, role: Option<Role>) -> Result<AuthResponse, AuthError> {
        PasswordService::validate_password_strength(password)?;

        let password_hash = PasswordService::hash_password(password)?;
        let role = role.unwrap_or(Role::Staff);
        let user = self.user_repo.create_user(email, &password_hash, role).await?;

        tracing::info!("Registered back-office account {} with role {}", user.email, user.role);

        let (id, email, role) = (user.id, user.email.clone(), user.role);
        self.issue_tokens(id, &email, role, user.into()).await
    }

    /// Login with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(password, &user.password_hash)? {
            tracing::warn!("Failed login attempt for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        let (id, email, role) = (user.id, user.email.clone(), user.role);
        self.issue_tokens(id, &email, role, user.into()).await
    }

    /// Rotate a refresh token into a new token pair
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<AuthResponse, AuthError> {
        let stored = self
            .token_repo
            .verify_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(stored.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // Rotation: the presented token is spent regardless of what follows
        self.token_repo.invalidate_token(refresh_token).await?;

        let (id, email, role) = (user.id, user.email.clone(), user.role);
        self.issue_tokens(id, &email, role, user.into()).await
    }

    /// Get current account information
    pub async fn get_current_user(&self, user_id: i32) -> Result<UserResponse, AuthError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    async fn issue_tokens(
        &self,
        user_id: i32,
        email: &str,
        role: Role,
        user: UserResponse,
    ) -> Result<AuthResponse, AuthError> {
        let (access_token, refresh_token) = self.token_service.generate_token_pair(user_id, email, role)?;

        let expires_at = Utc::now() + Duration::days(7);
        self.token_repo
            .store_refresh_token(user_id, &refresh_token, expires_at)
            .await?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user,
        })
    }
}
