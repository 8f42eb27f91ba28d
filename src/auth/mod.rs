// Authentication module
// Provides JWT-based authentication for the admin back-office with
// registration, login, token refresh, and role-gated route protection

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, me_handler, refresh_handler, register_handler};
pub use middleware::{AuthenticatedUser, RequireRole};
pub use models::{AdminUser, AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, Role, UserResponse};
pub use service::AuthService;
