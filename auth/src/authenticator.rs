use crate::jwt::AccessClaims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::RefreshClaims;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT issuance.
///
/// Owns the process-wide credential configuration: the signing secret, the
/// optional password pepper, and the access/refresh token lifetimes.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    access_token_ttl_secs: i64,
    refresh_token_ttl_days: i64,
}

/// Access/refresh token pair minted on successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    /// Signed short-lived access token
    pub access_token: String,

    /// Absolute expiry of the access token (Unix timestamp)
    pub expires_in: i64,

    /// Signed long-lived refresh token
    pub refresh_token: String,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `pepper` - Optional server-side password pepper
    /// * `access_token_ttl_secs` - Access token lifetime in seconds
    /// * `refresh_token_ttl_days` - Refresh token lifetime in days
    ///
    /// # Returns
    /// Configured Authenticator instance
    pub fn new(
        jwt_secret: &[u8],
        pepper: Option<String>,
        access_token_ttl_secs: i64,
        refresh_token_ttl_days: i64,
    ) -> Self {
        Self {
            password_hasher: PasswordHasher::new(pepper),
            jwt_handler: JwtHandler::new(jwt_secret),
            access_token_ttl_secs,
            refresh_token_ttl_days,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hashed password string
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    ///
    /// # Returns
    /// True if the password matches
    ///
    /// # Errors
    /// * `PasswordError` - Stored hash is malformed
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Mint an access/refresh token pair for an authenticated user.
    ///
    /// The refresh token is informational: nothing in this service redeems
    /// it for a fresh access token.
    ///
    /// # Arguments
    /// * `user_id` - User identifier
    /// * `email` - Email the user logged in with
    /// * `name` - Display name
    /// * `role` - Role marker
    ///
    /// # Returns
    /// TokenSet with both signed tokens and the access expiry
    ///
    /// # Errors
    /// * `JwtError` - Token encoding failed
    pub fn issue_tokens(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
        role: &str,
    ) -> Result<TokenSet, JwtError> {
        let access_claims =
            AccessClaims::new(user_id, email, name, role, self.access_token_ttl_secs);
        let refresh_claims = RefreshClaims::new(user_id, self.refresh_token_ttl_days);

        let access_token = self.jwt_handler.encode(&access_claims)?;
        let refresh_token = self.jwt_handler.encode(&refresh_claims)?;

        Ok(TokenSet {
            access_token,
            expires_in: access_claims.exp,
            refresh_token,
        })
    }

    /// Validate and decode an access token.
    ///
    /// # Arguments
    /// * `token` - JWT token string
    ///
    /// # Returns
    /// Decoded access claims
    ///
    /// # Errors
    /// * `InvalidToken` - Signature mismatch, expired, or malformed token
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        self.jwt_handler.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_hash_then_verify() {
        let authenticator = Authenticator::new(SECRET, Some("pepper".to_string()), 900, 7);

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(authenticator
            .verify_password("my_password", &hash)
            .expect("Failed to verify password"));
        assert!(!authenticator
            .verify_password("other_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_issue_tokens_claims() {
        let authenticator = Authenticator::new(SECRET, None, 900, 7);

        let tokens = authenticator
            .issue_tokens("user123", "a@x.com", "alice", "user")
            .expect("Failed to issue tokens");

        let claims = authenticator
            .validate_access_token(&tokens.access_token)
            .expect("Failed to validate token");

        assert_eq!(claims.user_id, "user123");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.exp, tokens.expires_in);

        let delta = claims.exp - chrono::Utc::now().timestamp();
        assert!((898..=900).contains(&delta));
    }

    #[test]
    fn test_refresh_token_decodes_as_refresh() {
        let authenticator = Authenticator::new(SECRET, None, 900, 7);
        let handler = JwtHandler::new(SECRET);

        let tokens = authenticator
            .issue_tokens("user123", "a@x.com", "alice", "user")
            .expect("Failed to issue tokens");

        let claims: RefreshClaims = handler
            .decode(&tokens.refresh_token)
            .expect("Failed to decode refresh token");

        assert_eq!(claims.user_id, "user123");
        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_validate_rejects_foreign_token() {
        let ours = Authenticator::new(SECRET, None, 900, 7);
        let theirs = Authenticator::new(b"another_secret_also_32_bytes_long!", None, 900, 7);

        let tokens = theirs
            .issue_tokens("user123", "a@x.com", "alice", "user")
            .expect("Failed to issue tokens");

        assert!(ours.validate_access_token(&tokens.access_token).is_err());
    }
}
