#![allow(async_fn_in_trait)]

pub mod cache;
pub mod config;
pub mod embedding;
pub mod enrich;
pub mod ingest;
pub mod logging;
pub mod matching;
pub mod parser;
pub mod prefs;
pub mod store;
pub mod vector;

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;

// Fixed seeds for canonical-key hashing. Changing them changes every job id,
// so existing rows and vector points would orphan.
const JOB_ID_SEED_K0: u64 = 0x9e37_79b9_7f4a_7c15;
const JOB_ID_SEED_K1: u64 = 0x85eb_ca6b_27d4_eb2f;

/// Unvalidated listing as it comes off a scraped markdown table.
/// Consumed immediately by enrichment, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    pub company: String,
    pub title: String,
    pub location: String,
    pub apply_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteType {
    Remote,
    Hybrid,
    Onsite,
}

impl RemoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteType::Remote => "remote",
            RemoteType::Hybrid => "hybrid",
            RemoteType::Onsite => "onsite",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "remote" => Some(RemoteType::Remote),
            "hybrid" => Some(RemoteType::Hybrid),
            "onsite" => Some(RemoteType::Onsite),
            _ => None,
        }
    }
}

/// Annual compensation estimate in USD.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryEstimate {
    pub base: u32,
    pub bonus: u32,
    pub total: u32,
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifestyleData {
    /// 1.0..=10.0
    pub work_life_balance: f32,
    /// 1.0..=10.0
    pub culture_score: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkData {
    pub alumni_count: u32,
    pub mutual_connections: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthData {
    /// Year-over-year headcount growth, percent.
    pub headcount_growth_pct: f32,
    /// 1.0..=10.0
    pub promotion_velocity: f32,
}

/// Canonical job record. `id` is derived from the `(company, title, location)`
/// natural key, so an upsert with a colliding key replaces the prior row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub company: String,
    pub title: String,
    pub location: Option<String>,
    pub remote_type: Option<RemoteType>,
    pub salary: Option<SalaryEstimate>,
    pub description: Option<String>,
    pub requirements: Vec<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub apply_url: Option<String>,
    pub source: String,
    pub lifestyle: Option<LifestyleData>,
    pub network: Option<NetworkData>,
    pub growth: Option<GrowthData>,
    pub embedding: Option<Vec<f32>>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Pass,
    Save,
    Apply,
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Like => "like",
            SwipeAction::Pass => "pass",
            SwipeAction::Save => "save",
            SwipeAction::Apply => "apply",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "like" => Some(SwipeAction::Like),
            "pass" => Some(SwipeAction::Pass),
            "save" => Some(SwipeAction::Save),
            "apply" => Some(SwipeAction::Apply),
            _ => None,
        }
    }

    /// `like` and `apply` count toward preference accumulation; `save` does not.
    pub fn is_positive(&self) -> bool {
        matches!(self, SwipeAction::Like | SwipeAction::Apply)
    }
}

/// Append-only behavioral event. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeEvent {
    pub user_id: String,
    pub job_id: String,
    pub action: SwipeAction,
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Derived preference snapshot. Recomputed on demand from the swipe log,
/// cached but never independently persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    pub liked_companies: BTreeSet<String>,
    pub disliked_companies: BTreeSet<String>,
    pub preferred_industries: BTreeSet<String>,
    pub salary_min: u32,
    /// Top locations by positive-signal frequency, at most three.
    pub location_preference: Vec<String>,
    pub work_style: String,
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        Self {
            liked_companies: BTreeSet::new(),
            disliked_companies: BTreeSet::new(),
            preferred_industries: BTreeSet::new(),
            salary_min: 60_000,
            location_preference: Vec::new(),
            work_style: "any".to_string(),
        }
    }
}

/// Per-factor sub-scores, each on a nominal 0-100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub semantic: f64,
    pub salary: f64,
    pub location: f64,
    pub industry: f64,
    pub network: f64,
    pub behavioral: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredJob {
    pub job: JobRecord,
    pub scores: SubScores,
    /// Bounded final ranking score, 65.0..=95.0.
    pub chemistry: f64,
    /// Up to three human-readable explanations, highest priority first.
    pub reasons: Vec<String>,
}

/// Normalized `(company, title, location)` tuple used for dedup and upsert
/// identity. Casing and surrounding whitespace never split a key.
pub fn canonical_key(company: &str, title: &str, location: Option<&str>) -> String {
    let norm = |s: &str| s.trim().to_lowercase();
    format!(
        "{}\u{1f}{}\u{1f}{}",
        norm(company),
        norm(title),
        norm(location.unwrap_or(""))
    )
}

/// Stable opaque job id: hex-encoded SipHash13 of the canonical key.
pub fn job_id(company: &str, title: &str, location: Option<&str>) -> String {
    let mut hasher = SipHasher13::new_with_keys(JOB_ID_SEED_K0, JOB_ID_SEED_K1);
    canonical_key(company, title, location).hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
