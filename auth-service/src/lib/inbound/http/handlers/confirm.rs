use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

pub async fn confirm(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ConfirmParams>,
) -> Result<ApiSuccess<ConfirmResponseData>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .auth_service
        .confirm(&user_id, &params.token)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfirmParams {
    pub token: String,
}

/// Activated-user view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmResponseData {
    pub id: String,
    pub email: Option<String>,
    pub user_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&User> for ConfirmResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_ref().map(|e| e.as_str().to_string()),
            user_name: user.user_name.clone(),
            status: user.status.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
        }
    }
}
