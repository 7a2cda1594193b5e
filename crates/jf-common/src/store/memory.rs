//! In-memory store used in tests and as a reference implementation of the
//! upsert/ordering contracts.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{JobStore, StoreError, UserProfile};
use crate::{JobRecord, SwipeEvent};

#[derive(Default)]
struct Inner {
    // Job id -> (record, write sequence). The sequence stands in for
    // `updated_at` recency without depending on wall-clock resolution.
    jobs: HashMap<String, (JobRecord, u64)>,
    users: HashMap<String, UserProfile>,
    swipes: Vec<SwipeEvent>,
    write_seq: u64,
}

/// Clones share the same underlying state.
#[derive(Default, Clone)]
pub struct MemoryJobStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: UserProfile) {
        self.inner
            .write()
            .await
            .users
            .insert(user.user_id.clone(), user);
    }

    pub async fn job_count(&self) -> usize {
        self.inner.read().await.jobs.len()
    }

    pub async fn get_job(&self, id: &str) -> Option<JobRecord> {
        self.inner
            .read()
            .await
            .jobs
            .get(id)
            .map(|(job, _)| job.clone())
    }

    pub async fn deactivate_job(&self, id: &str) {
        if let Some((job, _)) = self.inner.write().await.jobs.get_mut(id) {
            job.active = false;
        }
    }
}

impl JobStore for MemoryJobStore {
    async fn upsert_jobs(&self, jobs: &[JobRecord]) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        for job in jobs {
            inner.write_seq += 1;
            let seq = inner.write_seq;
            inner.jobs.insert(job.id.clone(), (job.clone(), seq));
        }
        Ok(jobs.len() as u64)
    }

    async fn fetch_jobs_by_ids(&self, ids: &[String]) -> Result<Vec<JobRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.jobs.get(id).map(|(job, _)| job.clone()))
            .collect())
    }

    async fn recent_active_jobs(&self, limit: usize) -> Result<Vec<JobRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut jobs: Vec<(&JobRecord, u64)> = inner
            .jobs
            .values()
            .filter(|(job, _)| job.active)
            .map(|(job, seq)| (job, *seq))
            .collect();

        jobs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));
        Ok(jobs
            .into_iter()
            .take(limit)
            .map(|(job, _)| job.clone())
            .collect())
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.inner.read().await.users.get(user_id).cloned())
    }

    async fn swipes_for_user(&self, user_id: &str) -> Result<Vec<SwipeEvent>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .swipes
            .iter()
            .filter(|event| event.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_swipe(&self, event: &SwipeEvent) -> Result<(), StoreError> {
        self.inner.write().await.swipes.push(event.clone());
        Ok(())
    }
}
