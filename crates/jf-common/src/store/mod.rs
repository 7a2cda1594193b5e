//! Relational persistence boundary. The core treats the store as a
//! dependency: select-by-key, upsert-by-key, append-only event inserts.

pub mod memory;
pub mod pg;

pub use memory::MemoryJobStore;
pub use pg::{create_pool_from_url, run_migrations, DbPoolError, PgJobStore, PgPool};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{JobRecord, SwipeEvent};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("failed to map row: {0}")]
    Mapping(String),
}

/// Minimal user record backing the feed query text. A missing user is the
/// one hard failure of a feed request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub skills: Vec<String>,
}

pub trait JobStore: Send + Sync {
    /// Idempotent batch upsert keyed on the derived job id. Last write wins.
    /// Returns the number of rows written.
    async fn upsert_jobs(&self, jobs: &[JobRecord]) -> Result<u64, StoreError>;

    /// Fetch full records preserving the order of `ids`; unknown ids are
    /// silently absent from the result.
    async fn fetch_jobs_by_ids(&self, ids: &[String]) -> Result<Vec<JobRecord>, StoreError>;

    /// Deterministic fallback candidate set: most recently written active
    /// jobs, ties broken by id.
    async fn recent_active_jobs(&self, limit: usize) -> Result<Vec<JobRecord>, StoreError>;

    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Full swipe log for a user in insertion order.
    async fn swipes_for_user(&self, user_id: &str) -> Result<Vec<SwipeEvent>, StoreError>;

    /// Append-only; events are never mutated or deleted.
    async fn insert_swipe(&self, event: &SwipeEvent) -> Result<(), StoreError>;
}

impl<T: JobStore + ?Sized> JobStore for std::sync::Arc<T> {
    async fn upsert_jobs(&self, jobs: &[JobRecord]) -> Result<u64, StoreError> {
        (**self).upsert_jobs(jobs).await
    }

    async fn fetch_jobs_by_ids(&self, ids: &[String]) -> Result<Vec<JobRecord>, StoreError> {
        (**self).fetch_jobs_by_ids(ids).await
    }

    async fn recent_active_jobs(&self, limit: usize) -> Result<Vec<JobRecord>, StoreError> {
        (**self).recent_active_jobs(limit).await
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        (**self).fetch_user(user_id).await
    }

    async fn swipes_for_user(&self, user_id: &str) -> Result<Vec<SwipeEvent>, StoreError> {
        (**self).swipes_for_user(user_id).await
    }

    async fn insert_swipe(&self, event: &SwipeEvent) -> Result<(), StoreError> {
        (**self).insert_swipe(event).await
    }
}
