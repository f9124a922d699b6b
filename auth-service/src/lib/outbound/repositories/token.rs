use std::str::FromStr;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::map_sqlx_error;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::ports::TokenRepository;
use crate::domain::token::models::TokenRecord;
use crate::domain::token::models::TokenType;
use crate::domain::user::models::UserId;

pub struct PostgresTokenRepository {
    pool: PgPool,
    /// Validity window applied to every created record.
    token_ttl: Duration,
}

impl PostgresTokenRepository {
    pub fn new(pool: PgPool, token_ttl_secs: i64) -> Self {
        Self {
            pool,
            token_ttl: Duration::seconds(token_ttl_secs),
        }
    }
}

/// Raw row shape; converted into the domain entity after fetching.
#[derive(sqlx::FromRow)]
struct TokenRow {
    id: Uuid,
    user_id: Uuid,
    token: String,
    token_type: String,
    created_at: DateTime<Utc>,
    expire_at: DateTime<Utc>,
}

impl TokenRow {
    fn try_into_record(self) -> Result<TokenRecord, AuthError> {
        Ok(TokenRecord {
            id: self.id,
            user_id: UserId(self.user_id),
            token_type: TokenType::from_str(&self.token_type)?,
            token: self.token,
            created_at: self.created_at,
            expire_at: self.expire_at,
        })
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn create(
        &self,
        user_id: &UserId,
        token_type: TokenType,
        token: String,
    ) -> Result<TokenRecord, AuthError> {
        let created_at = Utc::now();
        let record = TokenRecord {
            id: Uuid::new_v4(),
            user_id: *user_id,
            token_type,
            token,
            created_at,
            expire_at: created_at + self.token_ttl,
        };

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO user_tokens (id, user_id, token, token_type, created_at, expire_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id.0)
        .bind(&record.token)
        .bind(record.token_type.as_str())
        .bind(record.created_at)
        .bind(record.expire_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AuthError::ConstraintViolation(db_err.to_string());
                }
            }
            map_sqlx_error(e)
        })?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(record)
    }

    async fn verify(
        &self,
        user_id: &UserId,
        token: &str,
        token_type: TokenType,
    ) -> Result<Option<TokenRecord>, AuthError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, user_id, token, token_type, created_at, expire_at
            FROM user_tokens
            WHERE user_id = $1 AND token = $2 AND token_type = $3 AND expire_at >= $4
            ORDER BY expire_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.0)
        .bind(token)
        .bind(token_type.as_str())
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let record = match row {
            Some(row) => row.try_into_record()?,
            None => return Ok(None),
        };

        // Confirm tokens are single-use: consume the row before anyone else
        // can verify the same value.
        if record.token_type == TokenType::Confirm {
            sqlx::query(
                r#"
                DELETE FROM user_tokens
                WHERE user_id = $1 AND token = $2 AND token_type = $3
                "#,
            )
            .bind(user_id.0)
            .bind(token)
            .bind(TokenType::Confirm.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(Some(record))
    }

    async fn delete(
        &self,
        user_id: &UserId,
        token: &str,
        token_type: TokenType,
    ) -> Result<bool, AuthError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            DELETE FROM user_tokens
            WHERE user_id = $1 AND token = $2 AND token_type = $3
            "#,
        )
        .bind(user_id.0)
        .bind(token)
        .bind(token_type.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
