use thiserror::Error;

/// Error for TokenType parsing failures (corrupt storage value)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenTypeError {
    #[error("Unknown token type: {0}")]
    Unknown(String),
}
