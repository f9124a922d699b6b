use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::token::errors::TokenTypeError;
use crate::domain::user::models::UserId;

/// Kind of credential artifact a token row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
    Confirm,
}

impl TokenType {
    /// Storage/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
            TokenType::Confirm => "confirm",
        }
    }
}

impl FromStr for TokenType {
    type Err = TokenTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenType::Access),
            "refresh" => Ok(TokenType::Refresh),
            "confirm" => Ok(TokenType::Confirm),
            other => Err(TokenTypeError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable, typed, time-bounded credential artifact.
///
/// Rows are create-then-delete: a confirm token is inserted when issued
/// and removed on its first successful verification. Validity is purely
/// TTL-based (`expire_at >= now`); nothing updates a row in place.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub token_type: TokenType,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}

/// Envelope mirrored into the ephemeral cache for confirm tokens.
///
/// Keyed by `token_confirm:<user_id>` with a store-enforced TTL equal to
/// the confirm token's validity window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedConfirmToken {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}
