use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::OnceCell;
use tokio::time::timeout;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::ports::TokenCache;
use crate::domain::token::models::CachedConfirmToken;
use crate::domain::token::models::TokenType;
use crate::domain::user::models::UserId;

/// Short per-command deadline; a slow cache must degrade to a miss, not
/// stall the request.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis-backed first-look store for confirm tokens.
///
/// Mirrors freshly issued confirm tokens under `token_confirm:<user_id>`
/// with a server-enforced TTL. Strictly an optimization: every failure
/// mode collapses to `false` and the caller falls through to the durable
/// token store.
pub struct RedisTokenCache {
    client: redis::Client,
    connection: OnceCell<MultiplexedConnection>,
    token_ttl_secs: u64,
}

#[derive(Debug, Error)]
enum CacheOpError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error(transparent)]
    Envelope(#[from] serde_json::Error),

    #[error("cache command timed out")]
    Timeout(#[from] tokio::time::error::Elapsed),
}

fn confirm_key(user_id: &UserId) -> String {
    format!("token_{}:{}", TokenType::Confirm.as_str(), user_id)
}

impl RedisTokenCache {
    /// Create a cache handle; the connection itself is established lazily
    /// on first use and shared process-wide afterwards.
    ///
    /// # Errors
    /// * `Connectivity` - The URL could not be parsed into a client
    pub fn new(url: &str, token_ttl_secs: u64) -> Result<Self, AuthError> {
        let client =
            redis::Client::open(url).map_err(|e| AuthError::Connectivity(e.to_string()))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            token_ttl_secs,
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheOpError> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                let mut connection =
                    timeout(COMMAND_TIMEOUT, self.client.get_multiplexed_async_connection())
                        .await??;
                // Round-trip before trusting the connection.
                timeout(COMMAND_TIMEOUT, connection.ping::<()>()).await??;
                Ok::<_, CacheOpError>(connection)
            })
            .await?;

        Ok(connection.clone())
    }

    async fn try_push(&self, user_id: &UserId, token: &str) -> Result<(), CacheOpError> {
        let mut connection = self.connection().await?;
        let key = confirm_key(user_id);

        let envelope = serde_json::to_string(&CachedConfirmToken {
            token: token.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        })?;

        timeout(
            COMMAND_TIMEOUT,
            connection.set_ex::<_, _, ()>(&key, envelope, self.token_ttl_secs),
        )
        .await??;

        let ttl: i64 = timeout(COMMAND_TIMEOUT, connection.ttl(&key)).await??;
        tracing::debug!(key = %key, ttl_secs = ttl, "confirm token mirrored to cache");

        Ok(())
    }

    async fn try_verify(&self, user_id: &UserId, token: &str) -> Result<bool, CacheOpError> {
        let mut connection = self.connection().await?;
        let key = confirm_key(user_id);

        let envelope: Option<String> = timeout(COMMAND_TIMEOUT, connection.get(&key)).await??;
        let Some(envelope) = envelope else {
            return Ok(false);
        };

        let cached: CachedConfirmToken = serde_json::from_str(&envelope)?;
        if cached.token != token {
            // Not consumed: the entry may belong to a newer issuance and the
            // durable store decides what the submitted value is worth.
            tracing::debug!(key = %key, "cached confirm token does not match submitted value");
            return Ok(false);
        }

        timeout(COMMAND_TIMEOUT, connection.del::<_, ()>(&key)).await??;

        Ok(true)
    }
}

#[async_trait]
impl TokenCache for RedisTokenCache {
    async fn push(&self, user_id: &UserId, token: &str) -> bool {
        match self.try_push(user_id, token).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "confirm token cache write failed");
                false
            }
        }
    }

    async fn verify(&self, user_id: &UserId, token: &str) -> bool {
        match self.try_verify(user_id, token).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "confirm token cache read failed");
                false
            }
        }
    }
}
