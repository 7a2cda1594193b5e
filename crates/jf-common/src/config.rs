//! Environment-driven configuration, `JF_` prefix throughout.

use std::time::Duration;

use crate::embedding::EMBEDDING_DIMENSION;

#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Candidates requested from the vector index (and from the fallback).
    pub candidate_pool: usize,
    /// Maximum feed length returned to the caller.
    pub feed_size: usize,
    /// Semantic sub-score applied when no vector similarity is available.
    pub fallback_semantic: f64,
    pub feed_ttl: Duration,
    /// Shorter than `feed_ttl` so fresh swipes reshape preferences sooner.
    pub prefs_ttl: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            candidate_pool: 50,
            feed_size: 20,
            fallback_semantic: 75.0,
            feed_ttl: Duration::from_secs(300),
            prefs_ttl: Duration::from_secs(120),
        }
    }
}

impl MatchConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            candidate_pool: env_parse("JF_CANDIDATE_POOL").unwrap_or(defaults.candidate_pool),
            feed_size: env_parse("JF_FEED_SIZE").unwrap_or(defaults.feed_size),
            fallback_semantic: env_parse("JF_FALLBACK_SEMANTIC")
                .unwrap_or(defaults.fallback_semantic),
            feed_ttl: env_parse("JF_FEED_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.feed_ttl),
            prefs_ttl: env_parse("JF_PREFS_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.prefs_ttl),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: EMBEDDING_DIMENSION,
        }
    }
}

impl EmbeddingConfig {
    pub fn from_env() -> Self {
        Self {
            dimension: env_parse("JF_EMBEDDING_DIMENSION").unwrap_or(EMBEDDING_DIMENSION),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|raw| raw.parse().ok())
}
