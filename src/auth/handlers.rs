// HTTP handlers for authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UserResponse},
};

/// Register a new back-office account
/// POST /api/auth/register
pub async fn register_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let response = state
        .auth_service
        .register(&request.email, &request.password, request.role)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
/// POST /api/auth/login
pub async fn login_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let response = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(response))
}

/// Rotate a refresh token
/// POST /api/auth/refresh
pub async fn refresh_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state
        .auth_service
        .refresh_tokens(&request.refresh_token)
        .await?;

    Ok(Json(response))
}

/// Get current account information (protected endpoint)
/// GET /api/auth/me
pub async fn me_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    let response = state.auth_service.get_current_user(user.user_id).await?;

    Ok(Json(response))
}
