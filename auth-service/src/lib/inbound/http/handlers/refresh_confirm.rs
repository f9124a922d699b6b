use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

pub async fn refresh_confirm(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<RefreshConfirmResponseData>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .auth_service
        .request_confirm_token(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|confirm_token| {
            ApiSuccess::new(StatusCode::OK, RefreshConfirmResponseData { confirm_token })
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshConfirmResponseData {
    pub confirm_token: String,
}
