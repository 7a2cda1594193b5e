//! Read-through cache in front of the feed and preference computations.
//!
//! The cache is an optimization, never a correctness dependency: every
//! cache error is swallowed (and logged) and the caller always receives a
//! freshly computed value when the cache cannot help.

pub mod memory;
pub mod moka_cache;

pub use memory::{Clock, ManualClock, MemoryCache, SystemClock};
pub use moka_cache::MokaCache;

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend failure: {0}")]
    Backend(String),
}

/// Narrow string-valued contract; values are JSON-encoded by the helpers
/// below, mirroring what a Redis-backed deployment would store.
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

impl<T: Cache + ?Sized> Cache for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        (**self).set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key).await
    }
}

// Per-user key namespaces. Invalidation deletes these two keys directly
// instead of scanning the keyspace.
pub fn feed_cache_key(user_id: &str) -> String {
    format!("feed:{user_id}")
}

pub fn prefs_cache_key(user_id: &str) -> String {
    format!("prefs:{user_id}")
}

/// Read-through helper. Cache read errors fall through to `compute`; write
/// failures are logged and never propagated. Only `compute` errors reach
/// the caller.
pub async fn get_or_compute<C, T, E, F, Fut>(
    cache: &C,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Result<T, E>
where
    C: Cache,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match cache.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(key, error = %err, "discarding undecodable cache entry");
            }
        },
        Ok(None) => {}
        Err(err) => {
            warn!(key, error = %err, "cache read failed; computing fresh value");
        }
    }

    let value = compute().await?;

    match serde_json::to_string(&value) {
        Ok(raw) => {
            if let Err(err) = cache.set(key, &raw, ttl).await {
                warn!(key, error = %err, "cache write failed; returning fresh value");
            }
        }
        Err(err) => {
            warn!(key, error = %err, "failed to encode value for cache");
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct BrokenCache;

    impl Cache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("read refused".into()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Backend("write refused".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Backend("delete refused".into()))
        }
    }

    #[tokio::test]
    async fn hit_short_circuits_compute() {
        let cache = MemoryCache::new(Arc::new(SystemClock));
        cache
            .set("k", "\"cached\"", Duration::from_secs(60))
            .await
            .unwrap();

        let calls = AtomicUsize::new(0);
        let value: String = get_or_compute(&cache, "k", Duration::from_secs(60), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CacheError>("fresh".to_string())
        })
        .await
        .unwrap();

        assert_eq!(value, "cached");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn miss_computes_then_caches() {
        let cache = MemoryCache::new(Arc::new(SystemClock));

        let value: u32 = get_or_compute(&cache, "n", Duration::from_secs(60), || async {
            Ok::<_, CacheError>(41u32)
        })
        .await
        .unwrap();
        assert_eq!(value, 41);

        // Second read must come from the cache, not the new closure.
        let again: u32 = get_or_compute(&cache, "n", Duration::from_secs(60), || async {
            Ok::<_, CacheError>(99u32)
        })
        .await
        .unwrap();
        assert_eq!(again, 41);
    }

    #[tokio::test]
    async fn broken_cache_still_returns_fresh_value() {
        let value: u32 = get_or_compute(&BrokenCache, "n", Duration::from_secs(1), || async {
            Ok::<_, CacheError>(7u32)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn compute_errors_propagate() {
        let cache = MemoryCache::new(Arc::new(SystemClock));
        let result: Result<u32, CacheError> =
            get_or_compute(&cache, "k", Duration::from_secs(1), || async {
                Err(CacheError::Backend("compute blew up".into()))
            })
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn cache_keys_are_namespaced_per_user() {
        assert_eq!(feed_cache_key("u1"), "feed:u1");
        assert_eq!(prefs_cache_key("u1"), "prefs:u1");
        assert_ne!(feed_cache_key("u1"), feed_cache_key("u2"));
    }
}
