//! Brute-force in-memory index used in tests and small deployments.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{QueryFilter, VectorHit, VectorIndex, VectorIndexError, VectorPayload};

/// Clones share the same underlying state.
#[derive(Default, Clone)]
pub struct MemoryVectorIndex {
    entries: Arc<RwLock<HashMap<String, (Vec<f32>, VectorPayload)>>>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Cosine similarity mapped onto [0, 1]; zero on mismatched dimensions.
fn similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    ((dot / (norm_a * norm_b)) + 1.0) / 2.0
}

impl VectorIndex for MemoryVectorIndex {
    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        payload: &VectorPayload,
    ) -> Result<(), VectorIndexError> {
        self.entries
            .write()
            .await
            .insert(id.to_string(), (vector.to_vec(), payload.clone()));
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<QueryFilter>,
    ) -> Result<Vec<VectorHit>, VectorIndexError> {
        let active_only = filter.map(|f| f.active_only).unwrap_or(false);

        let entries = self.entries.read().await;
        let mut hits: Vec<VectorHit> = entries
            .iter()
            .filter(|(_, (_, payload))| !active_only || payload.active)
            .map(|(id, (stored, _))| VectorHit {
                id: id.clone(),
                score: similarity(vector, stored),
            })
            .collect();

        // Tie-break by id so equal scores order deterministically.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);

        Ok(hits)
    }
}
