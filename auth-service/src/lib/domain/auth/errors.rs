use thiserror::Error;

use crate::domain::token::errors::TokenTypeError;
use crate::domain::user::errors::EmailError;
use crate::domain::user::errors::UserIdError;
use crate::domain::user::errors::UserStatusError;

/// Top-level error for all authentication operations.
///
/// Login failures are deliberately collapsed into `InvalidCredentials`
/// whether the email is unknown or the password is wrong, so the endpoint
/// cannot be used to enumerate registered addresses.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid user status: {0}")]
    InvalidUserStatus(#[from] UserStatusError),

    #[error("Invalid token type: {0}")]
    InvalidTokenType(#[from] TokenTypeError),

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Jwt(#[from] auth::JwtError),

    // Domain-level errors
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Email or password not correct")]
    InvalidCredentials,

    #[error("Token is invalid")]
    InvalidToken,

    #[error("User not found: {0}")]
    UserNotFound(String),

    // Infrastructure errors
    #[error("Storage constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Store unreachable: {0}")]
    Connectivity(String),

    #[error("Database error: {0}")]
    Database(String),
}
