pub mod token;
pub mod user;

pub use token::PostgresTokenRepository;
pub use user::PostgresUserRepository;

use crate::domain::auth::errors::AuthError;

/// Translate low-level sqlx failures into the domain taxonomy.
///
/// Uniqueness violations are handled at each call site (they carry
/// constraint context); everything else is either a connectivity problem
/// or an opaque database error.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> AuthError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => AuthError::Connectivity(e.to_string()),
        _ => AuthError::Database(e.to_string()),
    }
}
