//! Write-path pipeline: parse listing dumps, dedup, enrich and embed each
//! listing concurrently, then land everything in the store and the vector
//! index.
//!
//! Failures are isolated per item. A listing whose embedding fails is still
//! upserted (minus its vector) and stays eligible for the fallback feed; a
//! store-level upsert failure is reported in the outcome rather than raised.

use std::collections::HashSet;

use futures::future::join_all;
use tracing::{info, warn};

use crate::embedding::{job_embedding_text, EmbeddingService};
use crate::enrich::EnrichmentService;
use crate::parser::parse_listing_tables;
use crate::store::JobStore;
use crate::vector::{VectorIndex, VectorPayload};
use crate::{canonical_key, JobRecord, RawListing};

/// One raw text payload plus the origin tag recorded on every job it yields.
#[derive(Debug, Clone)]
pub struct ListingSource {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Listings that survived parsing and dedup.
    pub parsed: usize,
    /// Rows written to the canonical store.
    pub synced: u64,
    pub errors: Vec<String>,
}

pub struct IngestService<S, E, V> {
    store: S,
    embedder: E,
    index: V,
    enrichment: EnrichmentService,
}

impl<S, E, V> IngestService<S, E, V>
where
    S: JobStore,
    E: EmbeddingService,
    V: VectorIndex,
{
    pub fn new(store: S, embedder: E, index: V, enrichment: EnrichmentService) -> Self {
        Self {
            store,
            embedder,
            index,
            enrichment,
        }
    }

    pub async fn sync_listings(&self, sources: &[ListingSource]) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        let listings = self.parse_sources(sources);
        outcome.parsed = listings.len();
        if listings.is_empty() {
            return outcome;
        }

        // Fan out enrichment + embedding per listing, fan in before the
        // single batch upsert.
        let jobs: Vec<JobRecord> = join_all(
            listings
                .iter()
                .map(|(listing, source)| self.enrich_and_embed(listing, source)),
        )
        .await
        .into_iter()
        .map(|(job, error)| {
            if let Some(message) = error {
                outcome.errors.push(message);
            }
            job
        })
        .collect();

        match self.store.upsert_jobs(&jobs).await {
            Ok(written) => outcome.synced = written,
            Err(err) => {
                warn!(error = %err, "batch upsert failed");
                outcome.errors.push(format!("store upsert failed: {err}"));
                return outcome;
            }
        }

        // Vector writes are independent of the relational upsert; a failed
        // point leaves the record fallback-eligible only.
        let vector_results = join_all(jobs.iter().filter_map(|job| {
            job.embedding.as_ref().map(|vector| async move {
                let payload = VectorPayload {
                    company: job.company.clone(),
                    title: job.title.clone(),
                    active: job.active,
                };
                (job.id.clone(), self.index.upsert(&job.id, vector, &payload).await)
            })
        }))
        .await;

        for (id, result) in vector_results {
            if let Err(err) = result {
                warn!(job_id = %id, error = %err, "vector upsert failed");
                outcome.errors.push(format!("vector upsert failed for {id}: {err}"));
            }
        }

        info!(
            parsed = outcome.parsed,
            synced = outcome.synced,
            errors = outcome.errors.len(),
            "listing sync finished"
        );
        outcome
    }

    /// Parse every source and drop canonical-key duplicates across the whole
    /// batch, keeping the first occurrence (and its source tag). Runs before
    /// enrichment so a duplicated listing is never enriched or embedded twice.
    fn parse_sources(&self, sources: &[ListingSource]) -> Vec<(RawListing, String)> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for source in sources {
            for listing in parse_listing_tables(&source.text) {
                let key =
                    canonical_key(&listing.company, &listing.title, Some(&listing.location));
                if seen.insert(key) {
                    result.push((listing, source.name.clone()));
                }
            }
        }
        result
    }

    async fn enrich_and_embed(
        &self,
        listing: &RawListing,
        source: &str,
    ) -> (JobRecord, Option<String>) {
        let mut job = self.enrichment.enrich(listing, source);

        match self.embedder.embed(&job_embedding_text(&job)).await {
            Ok(vector) => {
                job.embedding = Some(vector);
                (job, None)
            }
            Err(err) => {
                warn!(job_id = %job.id, error = %err, "embedding failed, record kept without vector");
                let message = format!("embedding failed for {}: {err}", job.id);
                (job, Some(message))
            }
        }
    }
}
