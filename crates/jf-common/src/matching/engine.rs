//! The matching engine ties the store, embedder, vector index, and cache
//! together behind `get_feed`.
//!
//! A feed request degrades instead of failing: vector-service trouble of any
//! kind routes through the recency fallback, and the only hard failure is an
//! unknown user. Cache trouble never surfaces at all.

use std::cmp::Ordering;
use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{feed_cache_key, get_or_compute, prefs_cache_key, Cache};
use crate::config::MatchConfig;
use crate::embedding::{profile_embedding_text, EmbeddingError, EmbeddingService};
use crate::matching::scoring::score_job;
use crate::prefs::learn_preferences;
use crate::store::{JobStore, StoreError, UserProfile};
use crate::vector::{QueryFilter, VectorIndex, VectorIndexError};
use crate::{JobRecord, PreferenceProfile, ScoredJob, SwipeEvent};

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything that can sink the semantic retrieval path. None of these reach
/// the caller; they all divert to the fallback candidate set.
#[derive(Debug, Error)]
enum RetrievalError {
    #[error(transparent)]
    Embed(#[from] EmbeddingError),
    #[error(transparent)]
    Index(#[from] VectorIndexError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Candidate carrying its semantic sub-score where the vector index
/// provided one.
struct Candidate {
    job: JobRecord,
    semantic: Option<f64>,
}

pub struct MatchingEngine<S, E, V, C> {
    store: S,
    embedder: E,
    index: V,
    cache: C,
    config: MatchConfig,
}

impl<S, E, V, C> MatchingEngine<S, E, V, C>
where
    S: JobStore,
    E: EmbeddingService,
    V: VectorIndex,
    C: Cache,
{
    pub fn new(store: S, embedder: E, index: V, cache: C, config: MatchConfig) -> Self {
        Self {
            store,
            embedder,
            index,
            cache,
            config,
        }
    }

    /// Ranked feed for one user, highest chemistry first, capped to the
    /// configured feed size. Served from cache when a fresh entry exists.
    pub async fn get_feed(&self, user_id: &str) -> Result<Vec<ScoredJob>, MatchError> {
        get_or_compute(
            &self.cache,
            &feed_cache_key(user_id),
            self.config.feed_ttl,
            || self.compute_feed(user_id),
        )
        .await
    }

    /// Preference profile for one user, derived from the swipe log and
    /// cached with a shorter TTL than the feed itself.
    pub async fn preferences(&self, user_id: &str) -> Result<PreferenceProfile, MatchError> {
        get_or_compute(
            &self.cache,
            &prefs_cache_key(user_id),
            self.config.prefs_ttl,
            || self.compute_preferences(user_id),
        )
        .await
    }

    /// Persists the swipe, then clears the user's cached feed and
    /// preferences so the next read reflects it.
    pub async fn record_swipe(&self, event: &SwipeEvent) -> Result<(), MatchError> {
        self.store.insert_swipe(event).await?;
        self.invalidate_user(&event.user_id).await;
        Ok(())
    }

    /// Drops the per-user cache entries. Failures are logged only; the
    /// entries will age out by TTL regardless.
    pub async fn invalidate_user(&self, user_id: &str) {
        for key in [feed_cache_key(user_id), prefs_cache_key(user_id)] {
            if let Err(err) = self.cache.delete(&key).await {
                warn!(key, error = %err, "cache invalidation failed");
            }
        }
    }

    async fn compute_feed(&self, user_id: &str) -> Result<Vec<ScoredJob>, MatchError> {
        let user = self
            .store
            .fetch_user(user_id)
            .await?
            .ok_or_else(|| MatchError::UserNotFound(user_id.to_string()))?;
        let prefs = self.preferences(user_id).await?;

        let candidates = self.retrieve_candidates(user_id, &user, &prefs).await?;

        let mut scored: Vec<ScoredJob> = candidates
            .into_iter()
            .filter(|candidate| candidate.job.active)
            .map(|candidate| {
                let semantic = candidate
                    .semantic
                    .unwrap_or(self.config.fallback_semantic);
                score_job(candidate.job, &prefs, semantic)
            })
            .collect();

        // Stable sort keeps retrieval order as the tie-break.
        scored.sort_by(|a, b| {
            b.chemistry
                .partial_cmp(&a.chemistry)
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(self.config.feed_size);

        Ok(scored)
    }

    async fn compute_preferences(&self, user_id: &str) -> Result<PreferenceProfile, MatchError> {
        let events = self.store.swipes_for_user(user_id).await?;

        let mut ids: Vec<String> = events.iter().map(|e| e.job_id.clone()).collect();
        ids.sort();
        ids.dedup();

        let jobs: HashMap<String, JobRecord> = self
            .store
            .fetch_jobs_by_ids(&ids)
            .await?
            .into_iter()
            .map(|job| (job.id.clone(), job))
            .collect();

        Ok(learn_preferences(&events, &jobs))
    }

    async fn retrieve_candidates(
        &self,
        user_id: &str,
        user: &UserProfile,
        prefs: &PreferenceProfile,
    ) -> Result<Vec<Candidate>, MatchError> {
        match self.semantic_candidates(user, prefs).await {
            Ok(candidates) if !candidates.is_empty() => return Ok(candidates),
            Ok(_) => {
                debug!(user_id, "semantic retrieval returned nothing, using fallback");
            }
            Err(err) => {
                warn!(user_id, error = %err, "semantic retrieval failed, using fallback");
            }
        }

        let mut jobs = self
            .store
            .recent_active_jobs(self.config.candidate_pool)
            .await?;
        // Canonical id order keeps the fallback feed deterministic.
        jobs.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(jobs
            .into_iter()
            .map(|job| Candidate {
                job,
                semantic: None,
            })
            .collect())
    }

    async fn semantic_candidates(
        &self,
        user: &UserProfile,
        prefs: &PreferenceProfile,
    ) -> Result<Vec<Candidate>, RetrievalError> {
        let query_text = profile_embedding_text(user, prefs);
        let vector = self.embedder.embed(&query_text).await?;

        let hits = self
            .index
            .query(
                &vector,
                self.config.candidate_pool,
                Some(QueryFilter { active_only: true }),
            )
            .await?;
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = hits.iter().map(|hit| hit.id.clone()).collect();
        let similarity: HashMap<&str, f32> = hits
            .iter()
            .map(|hit| (hit.id.as_str(), hit.score))
            .collect();

        // fetch preserves hit order, so retrieval rank survives as the
        // stable-sort tie-break.
        let jobs = self.store.fetch_jobs_by_ids(&ids).await?;

        Ok(jobs
            .into_iter()
            .map(|job| {
                let semantic = similarity
                    .get(job.id.as_str())
                    .map(|score| f64::from(*score) * 100.0);
                Candidate { job, semantic }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::embedding::{job_embedding_text, HashEmbedder};
    use crate::store::MemoryJobStore;
    use crate::vector::{MemoryVectorIndex, VectorHit, VectorPayload};
    use crate::{job_id, SalaryEstimate, SwipeAction};
    use chrono::Utc;

    struct FailingIndex;

    impl VectorIndex for FailingIndex {
        async fn upsert(
            &self,
            _id: &str,
            _vector: &[f32],
            _payload: &VectorPayload,
        ) -> Result<(), VectorIndexError> {
            Err(VectorIndexError::Backend("index down".into()))
        }

        async fn query(
            &self,
            _vector: &[f32],
            _k: usize,
            _filter: Option<QueryFilter>,
        ) -> Result<Vec<VectorHit>, VectorIndexError> {
            Err(VectorIndexError::Backend("index down".into()))
        }
    }

    fn engine_with_index<V: VectorIndex>(
        store: MemoryJobStore,
        index: V,
    ) -> MatchingEngine<MemoryJobStore, HashEmbedder, V, MemoryCache> {
        MatchingEngine::new(
            store,
            HashEmbedder::default(),
            index,
            MemoryCache::with_system_clock(),
            MatchConfig::default(),
        )
    }

    fn job(company: &str, title: &str, location: &str) -> JobRecord {
        JobRecord {
            id: job_id(company, title, Some(location)),
            company: company.to_string(),
            title: title.to_string(),
            location: Some(location.to_string()),
            salary: Some(SalaryEstimate {
                base: 100_000,
                bonus: 10_000,
                total: 110_000,
                benefits: vec![],
            }),
            industry: Some("Technology".into()),
            source: "test".into(),
            active: true,
            ..JobRecord::default()
        }
    }

    async fn seed_user(store: &MemoryJobStore, user_id: &str) {
        store
            .insert_user(UserProfile {
                user_id: user_id.to_string(),
                full_name: Some("Test User".into()),
                headline: Some("Software engineering student".into()),
                skills: vec!["Rust".into(), "SQL".into()],
            })
            .await;
    }

    #[tokio::test]
    async fn unknown_user_is_the_one_hard_failure() {
        let engine = engine_with_index(MemoryJobStore::default(), MemoryVectorIndex::default());
        let err = engine.get_feed("nobody").await.unwrap_err();
        assert!(matches!(err, MatchError::UserNotFound(id) if id == "nobody"));
    }

    #[tokio::test]
    async fn index_failure_falls_back_to_recent_active_jobs() {
        let store = MemoryJobStore::default();
        seed_user(&store, "u1").await;
        let jobs: Vec<JobRecord> = (0..5)
            .map(|i| job(&format!("Company {i}"), "Engineer", "Remote"))
            .collect();
        store.upsert_jobs(&jobs).await.unwrap();

        let engine = engine_with_index(store, FailingIndex);
        let feed = engine.get_feed("u1").await.unwrap();

        assert_eq!(feed.len(), 5);
        for window in feed.windows(2) {
            assert!(window[0].chemistry >= window[1].chemistry);
        }
    }

    #[tokio::test]
    async fn empty_index_also_falls_back() {
        let store = MemoryJobStore::default();
        seed_user(&store, "u1").await;
        store
            .upsert_jobs(&[job("Acme", "Engineer", "Remote")])
            .await
            .unwrap();

        let engine = engine_with_index(store, MemoryVectorIndex::default());
        let feed = engine.get_feed("u1").await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].job.company, "Acme");
    }

    #[tokio::test]
    async fn inactive_jobs_never_reach_the_feed() {
        let store = MemoryJobStore::default();
        seed_user(&store, "u1").await;

        let active = job("Acme", "Engineer", "Remote");
        let stale = job("Globex", "Engineer", "Remote");
        store
            .upsert_jobs(&[active.clone(), stale.clone()])
            .await
            .unwrap();

        // The index still advertises the deactivated job.
        let index = MemoryVectorIndex::default();
        let embedder = HashEmbedder::default();
        for record in [&active, &stale] {
            let vector = embedder.embed(&job_embedding_text(record)).await.unwrap();
            index
                .upsert(
                    &record.id,
                    &vector,
                    &VectorPayload {
                        company: record.company.clone(),
                        title: record.title.clone(),
                        active: true,
                    },
                )
                .await
                .unwrap();
        }
        store.deactivate_job(&stale.id).await;

        let engine = engine_with_index(store, index);
        let feed = engine.get_feed("u1").await.unwrap();

        assert!(!feed.is_empty());
        assert!(feed.iter().all(|scored| scored.job.id != stale.id));
    }

    #[tokio::test]
    async fn feed_is_capped_at_the_configured_size() {
        let store = MemoryJobStore::default();
        seed_user(&store, "u1").await;
        let jobs: Vec<JobRecord> = (0..30)
            .map(|i| job(&format!("Company {i}"), "Engineer", "Remote"))
            .collect();
        store.upsert_jobs(&jobs).await.unwrap();

        let engine = engine_with_index(store, MemoryVectorIndex::default());
        let feed = engine.get_feed("u1").await.unwrap();
        assert_eq!(feed.len(), 20);
    }

    #[tokio::test]
    async fn feed_is_cached_until_a_swipe_invalidates_it() {
        let store = MemoryJobStore::default();
        seed_user(&store, "u1").await;
        let first = job("Acme", "Engineer", "Remote");
        store.upsert_jobs(&[first.clone()]).await.unwrap();

        let engine = engine_with_index(store.clone(), MemoryVectorIndex::default());

        let before = engine.get_feed("u1").await.unwrap();
        assert_eq!(before.len(), 1);

        // New job lands; the cached feed must not see it yet.
        let second = job("Globex", "Analyst", "NYC");
        store.upsert_jobs(&[second.clone()]).await.unwrap();
        let cached = engine.get_feed("u1").await.unwrap();
        assert_eq!(cached.len(), 1);

        engine
            .record_swipe(&SwipeEvent {
                user_id: "u1".into(),
                job_id: first.id.clone(),
                action: SwipeAction::Like,
                session_id: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let after = engine.get_feed("u1").await.unwrap();
        assert_eq!(after.len(), 2);
    }

    #[tokio::test]
    async fn preferences_reflect_the_swipe_log() {
        let store = MemoryJobStore::default();
        seed_user(&store, "u1").await;
        let liked = job("Acme", "Engineer", "Remote");
        let passed = job("Globex", "Analyst", "NYC");
        store
            .upsert_jobs(&[liked.clone(), passed.clone()])
            .await
            .unwrap();

        for (job_id, action) in [(&liked.id, SwipeAction::Like), (&passed.id, SwipeAction::Pass)]
        {
            store
                .insert_swipe(&SwipeEvent {
                    user_id: "u1".into(),
                    job_id: job_id.clone(),
                    action,
                    session_id: None,
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        let engine = engine_with_index(store, MemoryVectorIndex::default());
        let prefs = engine.preferences("u1").await.unwrap();

        assert!(prefs.liked_companies.contains("Acme"));
        assert!(prefs.disliked_companies.contains("Globex"));
        assert_eq!(prefs.salary_min, 80_000);
    }

    #[tokio::test]
    async fn semantic_hits_rank_the_closest_job_first() {
        let store = MemoryJobStore::default();
        store
            .insert_user(UserProfile {
                user_id: "u1".into(),
                full_name: None,
                headline: Some("Rust backend engineer".into()),
                skills: vec!["Rust".into()],
            })
            .await;

        let rust_job = job("Acme", "Rust Backend Engineer", "Remote");
        let other_job = job("Globex", "Accountant", "NYC");
        store
            .upsert_jobs(&[rust_job.clone(), other_job.clone()])
            .await
            .unwrap();

        let embedder = HashEmbedder::default();
        let index = MemoryVectorIndex::default();
        for record in [&rust_job, &other_job] {
            let vector = embedder.embed(&job_embedding_text(record)).await.unwrap();
            index
                .upsert(
                    &record.id,
                    &vector,
                    &VectorPayload {
                        company: record.company.clone(),
                        title: record.title.clone(),
                        active: true,
                    },
                )
                .await
                .unwrap();
        }

        let engine = engine_with_index(store, index);
        let feed = engine.get_feed("u1").await.unwrap();

        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].job.id, rust_job.id);
        assert!(feed[0].scores.semantic >= feed[1].scores.semantic);
    }
}
