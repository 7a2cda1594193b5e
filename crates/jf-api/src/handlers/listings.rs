use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use jf_common::ingest::ListingSource;

use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub sources: Vec<SourcePayload>,
}

#[derive(Debug, Deserialize)]
pub struct SourcePayload {
    pub name: String,
    pub text: String,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub parsed: usize,
    pub synced: u64,
    pub errors: Vec<String>,
}

/// Run the ingestion pipeline over the submitted source texts. Per-item
/// failures come back in `errors`; the call itself only fails on malformed
/// input.
pub async fn sync_listings(
    State(state): State<SharedState>,
    Json(payload): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, ApiError> {
    if payload.sources.is_empty() {
        return Err(ApiError::BadRequest("at least one source is required".into()));
    }

    let sources: Vec<ListingSource> = payload
        .sources
        .into_iter()
        .map(|source| ListingSource {
            name: source.name,
            text: source.text,
        })
        .collect();

    info!(sources = sources.len(), "listing sync requested");
    let outcome = state.ingest.sync_listings(&sources).await;

    Ok(Json(SyncResponse {
        parsed: outcome.parsed,
        synced: outcome.synced,
        errors: outcome.errors,
    }))
}
