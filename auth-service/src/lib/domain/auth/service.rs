use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginTokens;
use crate::domain::auth::models::RegisteredUser;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::TokenCache;
use crate::domain::auth::ports::TokenRepository;
use crate::domain::auth::ports::UserRepository;
use crate::domain::token::models::TokenType;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserStatus;

/// Fixed role placeholder; this service has no role engine.
const USER_ROLE: &str = "user";

/// Domain service implementation for the authentication workflows.
///
/// Composes the credential hasher, token codec, durable token store, and
/// ephemeral token cache; owns every cross-component invariant. Requests
/// run independently against the shared stores, so no ordering is
/// guaranteed between concurrent calls for the same user.
pub struct AuthService<UR, TR, TC>
where
    UR: UserRepository,
    TR: TokenRepository,
    TC: TokenCache,
{
    user_repository: Arc<UR>,
    token_repository: Arc<TR>,
    token_cache: Arc<TC>,
    authenticator: Arc<Authenticator>,
    confirm_token_length: usize,
}

impl<UR, TR, TC> AuthService<UR, TR, TC>
where
    UR: UserRepository,
    TR: TokenRepository,
    TC: TokenCache,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `user_repository` - User persistence implementation
    /// * `token_repository` - Durable token store implementation
    /// * `token_cache` - Ephemeral confirm-token cache implementation
    /// * `authenticator` - Credential hashing and JWT issuance
    /// * `confirm_token_length` - Confirmation code length in characters
    pub fn new(
        user_repository: Arc<UR>,
        token_repository: Arc<TR>,
        token_cache: Arc<TC>,
        authenticator: Arc<Authenticator>,
        confirm_token_length: usize,
    ) -> Self {
        Self {
            user_repository,
            token_repository,
            token_cache,
            authenticator,
            confirm_token_length,
        }
    }

    /// Generate a confirm code, persist it durably, and mirror it into the
    /// cache. Cache failure is absorbed: the durable row alone is enough.
    async fn issue_confirm_token(&self, user_id: &UserId) -> Result<String, AuthError> {
        let code = auth::generate_confirm_code(self.confirm_token_length);

        let record = self
            .token_repository
            .create(user_id, TokenType::Confirm, code)
            .await?;

        if !self.token_cache.push(user_id, &record.token).await {
            tracing::warn!(
                user_id = %user_id,
                "confirm token not mirrored to cache, durable store remains authoritative"
            );
        }

        Ok(record.token)
    }
}

#[async_trait]
impl<UR, TR, TC> AuthServicePort for AuthService<UR, TR, TC>
where
    UR: UserRepository,
    TR: TokenRepository,
    TC: TokenCache,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<RegisteredUser, AuthError> {
        if let Some(existing) = self
            .user_repository
            .find_by_email(command.email.as_str())
            .await?
        {
            tracing::error!(email = %command.email, "email already registered");
            return Err(AuthError::DuplicateEmail(
                existing
                    .email
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| command.email.to_string()),
            ));
        }

        let password_hash = self.authenticator.hash_password(&command.password)?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: Some(command.email),
            user_name: command.user_name,
            password_hash,
            status: UserStatus::Pending,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };

        let created_user = self.user_repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "user created");

        let confirm_token = self.issue_confirm_token(&created_user.id).await?;

        Ok(RegisteredUser {
            user: created_user,
            confirm_token,
        })
    }

    async fn login(&self, email: &EmailAddress, password: &str) -> Result<LoginTokens, AuthError> {
        // Unknown email and wrong password take the same exit.
        let user = self
            .user_repository
            .find_by_email(email.as_str())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_matches = self
            .authenticator
            .verify_password(password, &user.password_hash)?;
        if !password_matches {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.authenticator.issue_tokens(
            &user.id.to_string(),
            email.as_str(),
            &user.user_name,
            USER_ROLE,
        )?;

        self.user_repository
            .update_last_login(&user.id, Utc::now())
            .await?;

        Ok(LoginTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.expires_in,
        })
    }

    async fn request_confirm_token(&self, user_id: &UserId) -> Result<String, AuthError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(user_id.to_string()))?;

        self.issue_confirm_token(user_id).await
    }

    async fn confirm(&self, user_id: &UserId, token: &str) -> Result<User, AuthError> {
        // Fast path: cache hit consumes the mirrored entry. The cached value
        // must match the submitted token exactly; a bare key hit is not
        // proof of validity.
        let cache_hit = self.token_cache.verify(user_id, token).await;

        if cache_hit {
            // The durable mirror of a consumed token must not stay
            // redeemable through the fallback path.
            self.token_repository
                .delete(user_id, token, TokenType::Confirm)
                .await?;
        } else {
            self.token_repository
                .verify(user_id, token, TokenType::Confirm)
                .await?
                .ok_or(AuthError::InvalidToken)?;
        }

        let user = self
            .user_repository
            .update_status(user_id, UserStatus::Active)
            .await?;
        tracing::info!(user_id = %user.id, "user confirmed");

        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: &UserId) -> Result<User, AuthError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::token::models::TokenRecord;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    // Define mocks in the test module using mockall
    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, AuthError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AuthError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
            async fn update_status(&self, id: &UserId, status: UserStatus) -> Result<User, AuthError>;
            async fn update_last_login(&self, id: &UserId, at: chrono::DateTime<Utc>) -> Result<(), AuthError>;
        }
    }

    mock! {
        pub TestTokenRepository {}

        #[async_trait]
        impl TokenRepository for TestTokenRepository {
            async fn create(&self, user_id: &UserId, token_type: TokenType, token: String) -> Result<TokenRecord, AuthError>;
            async fn verify(&self, user_id: &UserId, token: &str, token_type: TokenType) -> Result<Option<TokenRecord>, AuthError>;
            async fn delete(&self, user_id: &UserId, token: &str, token_type: TokenType) -> Result<bool, AuthError>;
        }
    }

    mock! {
        pub TestTokenCache {}

        #[async_trait]
        impl TokenCache for TestTokenCache {
            async fn push(&self, user_id: &UserId, token: &str) -> bool;
            async fn verify(&self, user_id: &UserId, token: &str) -> bool;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(
            SECRET,
            Some("test-pepper".to_string()),
            900,
            7,
        ))
    }

    fn service(
        user_repository: MockTestUserRepository,
        token_repository: MockTestTokenRepository,
        token_cache: MockTestTokenCache,
    ) -> AuthService<MockTestUserRepository, MockTestTokenRepository, MockTestTokenCache> {
        AuthService::new(
            Arc::new(user_repository),
            Arc::new(token_repository),
            Arc::new(token_cache),
            authenticator(),
            6,
        )
    }

    fn pending_user(email: &str, password_hash: String) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            email: Some(EmailAddress::new(email.to_string()).unwrap()),
            user_name: "testuser".to_string(),
            password_hash,
            status: UserStatus::Pending,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    fn token_record(user_id: UserId, token: &str, ttl_secs: i64) -> TokenRecord {
        let now = Utc::now();
        TokenRecord {
            id: uuid::Uuid::new_v4(),
            user_id,
            token_type: TokenType::Confirm,
            token: token.to_string(),
            created_at: now,
            expire_at: now + chrono::Duration::seconds(ttl_secs),
        }
    }

    fn register_command(email: &str) -> RegisterUserCommand {
        RegisterUserCommand::new(
            EmailAddress::new(email.to_string()).unwrap(),
            "testuser".to_string(),
            "password123".to_string(),
        )
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut user_repository = MockTestUserRepository::new();
        let mut token_repository = MockTestTokenRepository::new();
        let mut token_cache = MockTestTokenCache::new();

        user_repository
            .expect_find_by_email()
            .withf(|email| email == "test@example.com")
            .times(1)
            .returning(|_| Ok(None));

        user_repository
            .expect_create()
            .withf(|user| {
                user.email.as_ref().map(|e| e.as_str()) == Some("test@example.com")
                    && user.status == UserStatus::Pending
                    && user.password_hash.starts_with("$argon2")
                    && user.last_login_at.is_none()
            })
            .times(1)
            .returning(Ok);

        token_repository
            .expect_create()
            .withf(|_, token_type, token| {
                *token_type == TokenType::Confirm && token.len() == 6
            })
            .times(1)
            .returning(|user_id, _, token| Ok(token_record(*user_id, &token, 300)));

        token_cache.expect_push().times(1).returning(|_, _| true);

        let service = service(user_repository, token_repository, token_cache);

        let result = service.register(register_command("test@example.com")).await;
        assert!(result.is_ok());

        let registered = result.unwrap();
        assert_eq!(registered.user.status, UserStatus::Pending);
        assert_eq!(registered.confirm_token.len(), 6);
        assert!(registered
            .confirm_token
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_register_survives_cache_outage() {
        let mut user_repository = MockTestUserRepository::new();
        let mut token_repository = MockTestTokenRepository::new();
        let mut token_cache = MockTestTokenCache::new();

        user_repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        user_repository.expect_create().times(1).returning(Ok);
        token_repository
            .expect_create()
            .times(1)
            .returning(|user_id, _, token| Ok(token_record(*user_id, &token, 300)));

        // Cache down: push reports failure, registration still succeeds.
        token_cache.expect_push().times(1).returning(|_, _| false);

        let service = service(user_repository, token_repository, token_cache);

        let result = service.register(register_command("test@example.com")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut user_repository = MockTestUserRepository::new();
        let mut token_repository = MockTestTokenRepository::new();
        let mut token_cache = MockTestTokenCache::new();

        user_repository
            .expect_find_by_email()
            .withf(|email| email == "test@example.com")
            .times(1)
            .returning(|email| Ok(Some(pending_user(email, "$argon2id$hash".to_string()))));

        // The first registration's rows stay untouched.
        user_repository.expect_create().times(0);
        token_repository.expect_create().times(0);
        token_cache.expect_push().times(0);

        let service = service(user_repository, token_repository, token_cache);

        let result = service.register(register_command("test@example.com")).await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_login_success_updates_last_login() {
        let mut user_repository = MockTestUserRepository::new();
        let token_repository = MockTestTokenRepository::new();
        let token_cache = MockTestTokenCache::new();

        let password_hash = authenticator().hash_password("pw123").unwrap();
        let user = pending_user("a@x.com", password_hash);
        let user_id = user.id;

        user_repository
            .expect_find_by_email()
            .withf(|email| email == "a@x.com")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        user_repository
            .expect_update_last_login()
            .withf(move |id, _| *id == user_id)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(user_repository, token_repository, token_cache);

        let email = EmailAddress::new("a@x.com".to_string()).unwrap();
        let tokens = service.login(&email, "pw123").await.unwrap();

        assert_eq!(tokens.token_type, "Bearer");

        // The access token must decode back to the caller's identity.
        let claims = authenticator()
            .validate_access_token(&tokens.access_token)
            .unwrap();
        assert_eq!(claims.user_id, user_id.to_string());
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.exp, tokens.expires_in);
        let delta = claims.exp - Utc::now().timestamp();
        assert!((898..=900).contains(&delta));
    }

    #[tokio::test]
    async fn test_login_unknown_email_and_wrong_password_are_uniform() {
        // Unknown email
        let mut user_repository = MockTestUserRepository::new();
        user_repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        user_repository.expect_update_last_login().times(0);

        let service_unknown = service(
            user_repository,
            MockTestTokenRepository::new(),
            MockTestTokenCache::new(),
        );

        let email = EmailAddress::new("a@x.com".to_string()).unwrap();
        let unknown_err = service_unknown.login(&email, "pw123").await.unwrap_err();

        // Wrong password
        let mut user_repository = MockTestUserRepository::new();
        let password_hash = authenticator().hash_password("other-password").unwrap();
        user_repository
            .expect_find_by_email()
            .times(1)
            .returning(move |email| Ok(Some(pending_user(email, password_hash.clone()))));
        user_repository.expect_update_last_login().times(0);

        let service_wrong = service(
            user_repository,
            MockTestTokenRepository::new(),
            MockTestTokenCache::new(),
        );

        let wrong_err = service_wrong.login(&email, "pw123").await.unwrap_err();

        assert!(matches!(unknown_err, AuthError::InvalidCredentials));
        assert!(matches!(wrong_err, AuthError::InvalidCredentials));
        assert_eq!(unknown_err.to_string(), wrong_err.to_string());
    }

    #[tokio::test]
    async fn test_request_confirm_token_success() {
        let mut user_repository = MockTestUserRepository::new();
        let mut token_repository = MockTestTokenRepository::new();
        let mut token_cache = MockTestTokenCache::new();

        let user = pending_user("a@x.com", "$argon2id$hash".to_string());
        let user_id = user.id;

        user_repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        token_repository
            .expect_create()
            .withf(move |id, token_type, _| *id == user_id && *token_type == TokenType::Confirm)
            .times(1)
            .returning(|user_id, _, token| Ok(token_record(*user_id, &token, 300)));

        token_cache
            .expect_push()
            .withf(move |id, _| *id == user_id)
            .times(1)
            .returning(|_, _| true);

        let service = service(user_repository, token_repository, token_cache);

        let token = service.request_confirm_token(&user_id).await.unwrap();
        assert_eq!(token.len(), 6);
    }

    #[tokio::test]
    async fn test_request_confirm_token_unknown_user() {
        let mut user_repository = MockTestUserRepository::new();
        let mut token_repository = MockTestTokenRepository::new();

        user_repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        token_repository.expect_create().times(0);

        let service = service(
            user_repository,
            token_repository,
            MockTestTokenCache::new(),
        );

        let result = service.request_confirm_token(&UserId::new()).await;
        assert!(matches!(result, Err(AuthError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_request_confirm_token_twice_yields_distinct_codes() {
        let mut user_repository = MockTestUserRepository::new();
        let mut token_repository = MockTestTokenRepository::new();
        let mut token_cache = MockTestTokenCache::new();

        let user = pending_user("a@x.com", "$argon2id$hash".to_string());
        let user_id = user.id;

        user_repository
            .expect_find_by_id()
            .times(2)
            .returning(move |_| Ok(Some(user.clone())));

        // Both codes are persisted independently; no revocation of the first.
        token_repository
            .expect_create()
            .times(2)
            .returning(|user_id, _, token| Ok(token_record(*user_id, &token, 300)));
        token_repository.expect_delete().times(0);

        token_cache.expect_push().times(2).returning(|_, _| true);

        let service = service(user_repository, token_repository, token_cache);

        let first = service.request_confirm_token(&user_id).await.unwrap();
        let second = service.request_confirm_token(&user_id).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_confirm_cache_hit_skips_durable_verify() {
        let mut user_repository = MockTestUserRepository::new();
        let mut token_repository = MockTestTokenRepository::new();
        let mut token_cache = MockTestTokenCache::new();

        let user = pending_user("a@x.com", "$argon2id$hash".to_string());
        let user_id = user.id;

        token_cache
            .expect_verify()
            .withf(move |id, token| *id == user_id && token == "ABC123")
            .times(1)
            .returning(|_, _| true);

        token_repository.expect_verify().times(0);

        // The durable mirror row is consumed even on the fast path.
        token_repository
            .expect_delete()
            .withf(move |id, token, token_type| {
                *id == user_id && token == "ABC123" && *token_type == TokenType::Confirm
            })
            .times(1)
            .returning(|_, _, _| Ok(true));

        user_repository
            .expect_update_status()
            .withf(move |id, status| *id == user_id && *status == UserStatus::Active)
            .times(1)
            .returning(move |_, status| {
                let mut user = user.clone();
                user.status = status;
                Ok(user)
            });

        let service = service(user_repository, token_repository, token_cache);

        let confirmed = service.confirm(&user_id, "ABC123").await.unwrap();
        assert_eq!(confirmed.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn test_confirm_falls_back_to_durable_store() {
        let mut user_repository = MockTestUserRepository::new();
        let mut token_repository = MockTestTokenRepository::new();
        let mut token_cache = MockTestTokenCache::new();

        let user = pending_user("a@x.com", "$argon2id$hash".to_string());
        let user_id = user.id;

        token_cache.expect_verify().times(1).returning(|_, _| false);

        token_repository
            .expect_verify()
            .withf(move |id, token, token_type| {
                *id == user_id && token == "ABC123" && *token_type == TokenType::Confirm
            })
            .times(1)
            .returning(|user_id, token, _| Ok(Some(token_record(*user_id, token, 300))));

        user_repository
            .expect_update_status()
            .times(1)
            .returning(move |_, status| {
                let mut user = user.clone();
                user.status = status;
                Ok(user)
            });

        let service = service(user_repository, token_repository, token_cache);

        let confirmed = service.confirm(&user_id, "ABC123").await.unwrap();
        assert_eq!(confirmed.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn test_confirm_invalid_token() {
        let mut user_repository = MockTestUserRepository::new();
        let mut token_repository = MockTestTokenRepository::new();
        let mut token_cache = MockTestTokenCache::new();

        token_cache.expect_verify().times(1).returning(|_, _| false);
        token_repository
            .expect_verify()
            .times(1)
            .returning(|_, _, _| Ok(None));
        user_repository.expect_update_status().times(0);

        let service = service(user_repository, token_repository, token_cache);

        let result = service.confirm(&UserId::new(), "ABC123").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_confirm_token_is_single_use() {
        // The first success consumes both tiers: the cache entry on the hit
        // and the durable mirror row via delete. A replay misses everywhere.
        let mut user_repository = MockTestUserRepository::new();
        let mut token_repository = MockTestTokenRepository::new();
        let mut token_cache = MockTestTokenCache::new();

        let user = pending_user("a@x.com", "$argon2id$hash".to_string());
        let user_id = user.id;

        let mut cache_hits = vec![true];
        token_cache
            .expect_verify()
            .times(2)
            .returning(move |_, _| cache_hits.pop().unwrap_or(false));

        token_repository
            .expect_delete()
            .times(1)
            .returning(|_, _, _| Ok(true));

        token_repository
            .expect_verify()
            .times(1)
            .returning(|_, _, _| Ok(None));

        user_repository
            .expect_update_status()
            .times(1)
            .returning(move |_, status| {
                let mut user = user.clone();
                user.status = status;
                Ok(user)
            });

        let service = service(user_repository, token_repository, token_cache);

        assert!(service.confirm(&user_id, "ABC123").await.is_ok());

        let replay = service.confirm(&user_id, "ABC123").await;
        assert!(matches!(replay, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_get_user_by_id_success() {
        let mut user_repository = MockTestUserRepository::new();

        let user = pending_user("a@x.com", "$argon2id$hash".to_string());
        let user_id = user.id;

        user_repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(
            user_repository,
            MockTestTokenRepository::new(),
            MockTestTokenCache::new(),
        );

        let found = service.get_user_by_id(&user_id).await.unwrap();
        assert_eq!(found.id, user_id);
    }

    #[tokio::test]
    async fn test_get_user_by_id_not_found() {
        let mut user_repository = MockTestUserRepository::new();
        user_repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(
            user_repository,
            MockTestTokenRepository::new(),
            MockTestTokenCache::new(),
        );

        let result = service.get_user_by_id(&UserId::new()).await;
        assert!(matches!(result, Err(AuthError::UserNotFound(_))));
    }
}
