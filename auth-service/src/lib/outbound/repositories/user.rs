use std::str::FromStr;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::map_sqlx_error;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::ports::UserRepository;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserStatus;

const SELECT_COLUMNS: &str =
    "id, email, user_name, password_hash, status, created_at, updated_at, last_login_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row shape; converted into the domain entity after fetching.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: Option<String>,
    user_name: String,
    password_hash: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, AuthError> {
        Ok(User {
            id: UserId(self.id),
            email: self.email.map(EmailAddress::new).transpose()?,
            user_name: self.user_name,
            password_hash: self.password_hash,
            status: UserStatus::from_str(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_login_at: self.last_login_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, AuthError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, user_name, password_hash, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_ref().map(|e| e.as_str()))
        .bind(&user.user_name)
        .bind(&user.password_hash)
        .bind(user.status.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    if db_err.constraint() == Some("users_email_key") {
                        return AuthError::DuplicateEmail(
                            user.email
                                .as_ref()
                                .map(|e| e.as_str().to_string())
                                .unwrap_or_default(),
                        );
                    }
                    return AuthError::ConstraintViolation(db_err.to_string());
                }
            }
            map_sqlx_error(e)
        })?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(UserRow::try_into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(UserRow::try_into_user).transpose()
    }

    async fn update_status(&self, id: &UserId, status: UserStatus) -> Result<User, AuthError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id.0)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| AuthError::UserNotFound(id.to_string()))?;

        tx.commit().await.map_err(map_sqlx_error)?;

        row.try_into_user()
    }

    async fn update_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), AuthError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = $2, updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound(id.to_string()));
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(())
    }
}
