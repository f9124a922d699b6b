//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure for microservices:
//! - Password hashing (Argon2id, optionally keyed with a server-side pepper)
//! - JWT access/refresh token issuance and validation
//! - Short confirmation code generation
//! - Authentication coordination
//!
//! Each service defines its own authentication traits and adapts these implementations.
//! This avoids coupling services through shared domain logic while reducing code duplication.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new(Some("server-side-pepper".to_string()));
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Token Issuance
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", None, 900, 7);
//! let hash = auth.hash_password("password123").unwrap();
//! let tokens = auth
//!     .issue_tokens("user123", "alice@example.com", "alice", "user")
//!     .unwrap();
//! let claims = auth.validate_access_token(&tokens.access_token).unwrap();
//! assert_eq!(claims.email, "alice@example.com");
//! ```

pub mod authenticator;
pub mod confirm;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use authenticator::TokenSet;
pub use confirm::generate_confirm_code;
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::RefreshClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;
