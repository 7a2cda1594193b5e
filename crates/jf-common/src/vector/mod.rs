//! Approximate-nearest-neighbor boundary. Failures here are always
//! recoverable: the matching engine falls back to a deterministic candidate
//! set instead of surfacing an error to the feed caller.

pub mod memory;
pub mod qdrant;

pub use memory::MemoryVectorIndex;
pub use qdrant::QdrantIndex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorIndexError {
    #[error("vector backend failure: {0}")]
    Backend(String),
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },
    #[error("malformed point id: {0}")]
    MalformedId(String),
}

/// Ranked retrieval result; `score` is similarity in [0, 1], higher is closer.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub id: String,
    pub score: f32,
}

/// Metadata stored alongside a point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorPayload {
    pub company: String,
    pub title: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryFilter {
    pub active_only: bool,
}

pub trait VectorIndex: Send + Sync {
    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        payload: &VectorPayload,
    ) -> Result<(), VectorIndexError>;

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<QueryFilter>,
    ) -> Result<Vec<VectorHit>, VectorIndexError>;
}

impl<T: VectorIndex + ?Sized> VectorIndex for std::sync::Arc<T> {
    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        payload: &VectorPayload,
    ) -> Result<(), VectorIndexError> {
        (**self).upsert(id, vector, payload).await
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<QueryFilter>,
    ) -> Result<Vec<VectorHit>, VectorIndexError> {
        (**self).query(vector, k, filter).await
    }
}
