// Authentication middleware for protected routes

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::{error::AuthError, models::Role, token::TokenService};

/// Authenticated account extractor for protected routes
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::TokenGenerationError("JWT_SECRET not configured".to_string()))?;

        let token_service = TokenService::new(jwt_secret);
        let claims = token_service.validate_access_token(token)?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Authorization middleware that requires a specific role
///
/// Extracts the JWT token from the Authorization header, validates it, and
/// checks that the account carries the required role. Admin passes every
/// check; staff passes only staff-level checks.
#[derive(Debug, Clone)]
pub struct RequireRole {
    required_role: Role,
}

impl RequireRole {
    /// Create a new RequireRole middleware with the specified role requirement
    pub fn new(required_role: Role) -> Self {
        Self { required_role }
    }

    /// Create a middleware that requires the admin role
    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    /// Create a middleware that requires at least the staff role
    pub fn staff() -> Self {
        Self::new(Role::Staff)
    }

    /// Middleware function that validates role-based access
    pub async fn middleware(
        self,
        request: Request<Body>,
        next: Next,
    ) -> Result<Response, AuthError> {
        let endpoint = request.uri().path().to_string();

        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .ok_or_else(|| {
                warn!("Missing Authorization header in request to protected endpoint: {}", endpoint);
                AuthError::MissingToken
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header format for endpoint: {}", endpoint);
                AuthError::InvalidToken
            })?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                warn!("Authorization header missing 'Bearer ' prefix for endpoint: {}", endpoint);
                AuthError::InvalidToken
            })?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::TokenGenerationError("JWT_SECRET not configured".to_string()))?;

        let token_service = TokenService::new(jwt_secret);
        let claims = token_service.validate_access_token(token)?;

        if !Self::role_allows(claims.role, self.required_role) {
            warn!(
                "Account {} with role {} denied access to {} (requires {})",
                claims.sub, claims.role, endpoint, self.required_role
            );
            return Err(AuthError::Forbidden(format!(
                "This endpoint requires the {} role",
                self.required_role
            )));
        }

        Ok(next.run(request).await)
    }

    /// Role hierarchy: admin satisfies every requirement, staff only staff
    fn role_allows(actual: Role, required: Role) -> bool {
        match (actual, required) {
            (Role::Admin, _) => true,
            (Role::Staff, Role::Staff) => true,
            (Role::Staff, Role::Admin) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_allows_admin_everywhere() {
        assert!(RequireRole::role_allows(Role::Admin, Role::Admin));
        assert!(RequireRole::role_allows(Role::Admin, Role::Staff));
    }

    #[test]
    fn test_role_allows_staff_only_staff() {
        assert!(RequireRole::role_allows(Role::Staff, Role::Staff));
        assert!(!RequireRole::role_allows(Role::Staff, Role::Admin));
    }
}
