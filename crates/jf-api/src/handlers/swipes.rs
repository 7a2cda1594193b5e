use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use jf_common::{SwipeAction, SwipeEvent};

use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub user_id: String,
    pub job_id: String,
    pub action: SwipeAction,
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct SwipeResponse {
    pub status: &'static str,
}

/// Append the swipe and clear the user's cached feed and preferences so the
/// next read reflects it.
pub async fn record_swipe(
    State(state): State<SharedState>,
    Json(payload): Json<SwipeRequest>,
) -> Result<(StatusCode, Json<SwipeResponse>), ApiError> {
    if payload.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id is required".into()));
    }
    if payload.job_id.trim().is_empty() {
        return Err(ApiError::BadRequest("job_id is required".into()));
    }

    let event = SwipeEvent {
        user_id: payload.user_id,
        job_id: payload.job_id,
        action: payload.action,
        session_id: payload.session_id,
        created_at: Utc::now(),
    };
    state.engine.record_swipe(&event).await?;

    Ok((StatusCode::CREATED, Json(SwipeResponse { status: "recorded" })))
}
