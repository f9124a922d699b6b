use thiserror::Error;

/// Error type for JWT operations.
///
/// Verification failures deliberately collapse into the single
/// `InvalidToken` variant: callers must not learn whether the signature,
/// the expiry, or the structure was at fault.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is invalid")]
    InvalidToken,
}
