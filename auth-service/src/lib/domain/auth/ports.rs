use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginTokens;
use crate::domain::auth::models::RegisteredUser;
use crate::domain::token::models::TokenRecord;
use crate::domain::token::models::TokenType;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserStatus;

/// Port for the authentication workflows exposed to the boundary layer.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account in `Pending` status and issue its first
    /// confirmation token.
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `ConstraintViolation` - Storage uniqueness conflict
    /// * `Database` - Storage operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<RegisteredUser, AuthError>;

    /// Verify credentials and mint an access/refresh token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (uniform)
    /// * `Database` - Storage operation failed
    async fn login(&self, email: &EmailAddress, password: &str) -> Result<LoginTokens, AuthError>;

    /// Issue a fresh confirmation token for an existing user.
    ///
    /// Previously issued tokens are not revoked; they lapse by TTL.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `Database` - Storage operation failed
    async fn request_confirm_token(&self, user_id: &UserId) -> Result<String, AuthError>;

    /// Consume a confirmation token and activate the account.
    ///
    /// # Errors
    /// * `InvalidToken` - Token missing, expired, or already consumed
    /// * `UserNotFound` - User row vanished before activation
    /// * `Database` - Storage operation failed
    async fn confirm(&self, user_id: &UserId, token: &str) -> Result<User, AuthError>;

    /// Retrieve a user by unique identifier.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `Database` - Storage operation failed
    async fn get_user_by_id(&self, user_id: &UserId) -> Result<User, AuthError>;
}

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email uniqueness constraint violated
    /// * `ConstraintViolation` - Other uniqueness constraint violated
    /// * `Database` - Storage operation failed
    async fn create(&self, user: User) -> Result<User, AuthError>;

    /// Retrieve user by identifier (None if not found).
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AuthError>;

    /// Retrieve user by email address (None if not found).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Set the lifecycle status and refresh `updated_at`.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `Database` - Storage operation failed
    async fn update_status(&self, id: &UserId, status: UserStatus) -> Result<User, AuthError>;

    /// Record a successful login timestamp.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `Database` - Storage operation failed
    async fn update_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), AuthError>;
}

/// Persistence operations for durable token records.
#[async_trait]
pub trait TokenRepository: Send + Sync + 'static {
    /// Persist a new token record, stamping creation and expiry from the
    /// configured TTL.
    ///
    /// # Errors
    /// * `ConstraintViolation` - Storage uniqueness conflict
    /// * `Database` - Storage operation failed
    async fn create(
        &self,
        user_id: &UserId,
        token_type: TokenType,
        token: String,
    ) -> Result<TokenRecord, AuthError>;

    /// Find the most relevant live record matching owner, value, and type.
    ///
    /// Filters on `expire_at >= now`, latest expiry wins ties. A matched
    /// confirm-type record is deleted as a side effect (single use).
    async fn verify(
        &self,
        user_id: &UserId,
        token: &str,
        token_type: TokenType,
    ) -> Result<Option<TokenRecord>, AuthError>;

    /// Remove matching records; true when at least one row was deleted.
    /// Consumes the durable mirror after a cache-hit confirmation and
    /// serves explicit invalidation.
    async fn delete(
        &self,
        user_id: &UserId,
        token: &str,
        token_type: TokenType,
    ) -> Result<bool, AuthError>;
}

/// Ephemeral first-look cache for confirm tokens.
///
/// A performance optimization only: both operations degrade to `false` on
/// any cache failure and the caller falls through to the durable store.
/// Neither operation ever returns an error.
#[async_trait]
pub trait TokenCache: Send + Sync + 'static {
    /// Mirror a freshly issued confirm token; false when the cache is
    /// unreachable or the write fails.
    async fn push(&self, user_id: &UserId, token: &str) -> bool;

    /// Compare-and-consume: true only when the cached value exists and
    /// matches `token` exactly, deleting the entry on that hit.
    async fn verify(&self, user_id: &UserId, token: &str) -> bool;
}
