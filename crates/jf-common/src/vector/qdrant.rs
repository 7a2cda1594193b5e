//! Qdrant-backed index. Point ids are the u64 behind the hex job id, which
//! keeps upserts idempotent on the vector side as well.

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::info;

use super::{QueryFilter, VectorHit, VectorIndex, VectorIndexError};

pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantIndex {
    pub fn new(client: Qdrant, collection: impl Into<String>, dimension: usize) -> Self {
        Self {
            client,
            collection: collection.into(),
            dimension,
        }
    }

    pub async fn connect(
        url: &str,
        collection: impl Into<String>,
        dimension: usize,
    ) -> Result<Self, VectorIndexError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|err| VectorIndexError::Backend(err.to_string()))?;
        let index = Self::new(client, collection, dimension);
        index.ensure_collection().await?;
        Ok(index)
    }

    /// Create the collection if it does not exist yet. Idempotent.
    pub async fn ensure_collection(&self) -> Result<(), VectorIndexError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|err| VectorIndexError::Backend(err.to_string()))?;

        if exists {
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                ),
            )
            .await
            .map_err(|err| VectorIndexError::Backend(err.to_string()))?;

        info!(
            collection = %self.collection,
            dimension = self.dimension,
            "created vector collection"
        );
        Ok(())
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), VectorIndexError> {
        if vector.len() != self.dimension {
            return Err(VectorIndexError::Dimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

fn numeric_id(id: &str) -> Result<u64, VectorIndexError> {
    u64::from_str_radix(id, 16).map_err(|_| VectorIndexError::MalformedId(id.to_string()))
}

fn hex_id(options: &PointIdOptions) -> String {
    match options {
        PointIdOptions::Num(n) => format!("{n:016x}"),
        PointIdOptions::Uuid(u) => u.clone(),
    }
}

impl VectorIndex for QdrantIndex {
    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        payload: &super::VectorPayload,
    ) -> Result<(), VectorIndexError> {
        self.check_dimension(vector)?;
        let point_id = numeric_id(id)?;

        let mut stored = Payload::new();
        stored.insert("company", payload.company.clone());
        stored.insert("title", payload.title.clone());
        stored.insert("active", payload.active);

        let point = PointStruct::new(point_id, vector.to_vec(), stored);
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]))
            .await
            .map_err(|err| VectorIndexError::Backend(err.to_string()))?;

        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<QueryFilter>,
    ) -> Result<Vec<VectorHit>, VectorIndexError> {
        self.check_dimension(vector)?;

        let mut search =
            SearchPointsBuilder::new(&self.collection, vector.to_vec(), k as u64).with_payload(false);

        if filter.map(|f| f.active_only).unwrap_or(false) {
            search = search.filter(Filter::must([Condition::matches("active", true)]));
        }

        let response = self
            .client
            .search_points(search)
            .await
            .map_err(|err| VectorIndexError::Backend(err.to_string()))?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|point| {
                let options = point.id.and_then(|id| id.point_id_options)?;
                Some(VectorHit {
                    id: hex_id(&options),
                    // Cosine similarity from qdrant is [-1, 1]; clamp so the
                    // semantic sub-score stays on its documented scale.
                    score: point.score.clamp(0.0, 1.0),
                })
            })
            .collect())
    }
}
