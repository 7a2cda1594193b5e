//! Embedding boundary: a narrow `embed(text) -> vector` contract with a
//! fixed dimension shared by job and user vectors.

pub mod hash_embedder;

pub use hash_embedder::HashEmbedder;

use thiserror::Error;

use crate::store::UserProfile;
use crate::{JobRecord, PreferenceProfile};

/// Dimension shared across every job and user vector in a deployment.
/// Must never vary at runtime; the vector index is created against it.
pub const EMBEDDING_DIMENSION: usize = 1536;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding backend failure: {0}")]
    Backend(String),
    #[error("cannot embed empty text")]
    EmptyInput,
}

pub trait EmbeddingService: Send + Sync {
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

impl<T: EmbeddingService + ?Sized> EmbeddingService for std::sync::Arc<T> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text).await
    }
}

/// Canonical text rendering of a job for embedding. Field order is fixed so
/// re-embedding an unchanged record yields the same vector.
pub fn job_embedding_text(job: &JobRecord) -> String {
    let mut parts = vec![format!("{} at {}", job.title, job.company)];

    if let Some(location) = &job.location {
        parts.push(format!("located in {location}"));
    }
    if let Some(remote) = job.remote_type {
        parts.push(format!("{} role", remote.as_str()));
    }
    if let Some(industry) = &job.industry {
        parts.push(format!("{industry} industry"));
    }
    if !job.requirements.is_empty() {
        parts.push(format!("requires {}", job.requirements.join(", ")));
    }
    if let Some(description) = &job.description {
        parts.push(description.clone());
    }

    parts.join(". ")
}

/// Canonical text rendering of a user plus learned preferences, used to
/// build the feed query vector.
pub fn profile_embedding_text(user: &UserProfile, prefs: &PreferenceProfile) -> String {
    let mut parts = Vec::new();

    if let Some(headline) = &user.headline {
        parts.push(headline.clone());
    }
    if !user.skills.is_empty() {
        parts.push(format!("skills: {}", user.skills.join(", ")));
    }
    parts.push(format!("prefers {} work", prefs.work_style));
    if !prefs.preferred_industries.is_empty() {
        parts.push(format!(
            "interested in {}",
            prefs
                .preferred_industries
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    if !prefs.liked_companies.is_empty() {
        parts.push(format!(
            "likes companies such as {}",
            prefs
                .liked_companies
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    if !prefs.location_preference.is_empty() {
        parts.push(format!("in {}", prefs.location_preference.join(" or ")));
    }

    parts.join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RemoteType;

    #[test]
    fn job_text_is_deterministic_and_covers_known_fields() {
        let job = JobRecord {
            id: "1".into(),
            company: "Acme".into(),
            title: "Engineer".into(),
            location: Some("Remote".into()),
            remote_type: Some(RemoteType::Remote),
            industry: Some("Technology".into()),
            requirements: vec!["Rust".into(), "SQL".into()],
            active: true,
            ..JobRecord::default()
        };

        let text = job_embedding_text(&job);
        assert_eq!(text, job_embedding_text(&job));
        assert!(text.contains("Engineer at Acme"));
        assert!(text.contains("Technology industry"));
        assert!(text.contains("requires Rust, SQL"));
    }

    #[test]
    fn profile_text_always_mentions_work_style() {
        let user = UserProfile {
            user_id: "u1".into(),
            full_name: None,
            headline: None,
            skills: vec![],
        };
        let text = profile_embedding_text(&user, &PreferenceProfile::default());
        assert!(text.contains("prefers any work"));
    }
}
