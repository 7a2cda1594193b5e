//! In-memory cache with an injectable clock so TTL behavior is testable
//! without sleeping.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::{Cache, CacheError};

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        static ORIGIN: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        ORIGIN.get_or_init(Instant::now).elapsed().as_millis() as u64
    }
}

/// Test clock advanced by hand.
#[derive(Default)]
pub struct ManualClock {
    ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, delta: Duration) {
        self.ms.fetch_add(delta.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.ms.load(Ordering::SeqCst)
    }
}

pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, u64)>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.get(key).await.ok().flatten().is_some()
    }
}

impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > self.clock.now_ms() => {
                Ok(Some(value.clone()))
            }
            Some(_) => {
                // Lazy eviction of the expired entry.
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = self.clock.now_ms() + ttl.as_millis() as u64;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_the_value() {
        let cache = MemoryCache::with_system_clock();
        cache.set("k", "v", Duration::from_secs(30)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn entries_expire_under_a_simulated_clock() {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::new(clock.clone());

        cache.set("k", "v", Duration::from_secs(10)).await.unwrap();
        assert!(cache.contains("k").await);

        clock.advance(Duration::from_secs(9));
        assert!(cache.contains("k").await);

        clock.advance(Duration::from_secs(2));
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_an_entry_before_expiry() {
        let cache = MemoryCache::with_system_clock();
        cache.set("k", "v", Duration::from_secs(30)).await.unwrap();
        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn overwriting_resets_the_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::new(clock.clone());

        cache.set("k", "old", Duration::from_secs(5)).await.unwrap();
        clock.advance(Duration::from_secs(4));
        cache.set("k", "new", Duration::from_secs(5)).await.unwrap();
        clock.advance(Duration::from_secs(4));

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
    }
}
