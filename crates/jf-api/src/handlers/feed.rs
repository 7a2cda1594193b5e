use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use jf_common::{PreferenceProfile, ScoredJob};

use crate::error::ApiError;
use crate::SharedState;

#[derive(Serialize)]
pub struct FeedResponse {
    pub user_id: String,
    pub jobs: Vec<ScoredJob>,
}

/// Ranked feed for one user. Unknown users are the only 4xx here; backend
/// degradation is absorbed by the engine's fallback path.
pub async fn get_feed(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<FeedResponse>, ApiError> {
    let jobs = state.engine.get_feed(&user_id).await?;
    Ok(Json(FeedResponse { user_id, jobs }))
}

pub async fn get_preferences(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<PreferenceProfile>, ApiError> {
    let prefs = state.engine.preferences(&user_id).await?;
    Ok(Json(prefs))
}
