use crate::domain::user::models::User;

/// Result of a successful registration: the pending user plus the confirm
/// token the caller is expected to deliver (e.g. by email).
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub user: User,
    pub confirm_token: String,
}

/// Token pair minted on successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Absolute expiry of the access token (Unix timestamp)
    pub expires_in: i64,
}
