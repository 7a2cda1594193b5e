//! Turns raw listings into canonical job records.
//!
//! Deterministic fields (remote type, industry, company size) are pure
//! functions of the input; estimator-backed fields always come back
//! well-typed so scoring never has to branch on missing data.

pub mod company_info;
pub mod estimators;

use crate::{job_id, JobRecord, RawListing, RemoteType};
use company_info::lookup_company;
use estimators::Estimators;

pub struct EnrichmentService {
    estimators: Estimators,
}

impl Default for EnrichmentService {
    fn default() -> Self {
        Self::new(Estimators::default())
    }
}

impl EnrichmentService {
    pub fn new(estimators: Estimators) -> Self {
        Self { estimators }
    }

    /// Build a canonical record from a raw listing. Pure except for the
    /// estimator calls, which are themselves deterministic.
    pub fn enrich(&self, listing: &RawListing, source: &str) -> JobRecord {
        let location = non_empty(&listing.location);
        let info = lookup_company(&listing.company);

        JobRecord {
            id: job_id(&listing.company, &listing.title, location.as_deref()),
            company: listing.company.trim().to_string(),
            title: listing.title.trim().to_string(),
            remote_type: location.as_deref().and_then(detect_remote_type),
            location,
            salary: Some(self.estimators.salary.estimate(listing)),
            description: None,
            requirements: Vec::new(),
            industry: Some(info.industry.to_string()),
            company_size: Some(info.size.to_string()),
            apply_url: non_empty(&listing.apply_url),
            source: source.to_string(),
            lifestyle: Some(self.estimators.lifestyle.estimate(listing)),
            network: Some(self.estimators.network.estimate(listing)),
            growth: Some(self.estimators.growth.estimate(listing)),
            embedding: None,
            active: true,
        }
    }
}

/// Classify the work arrangement from free-form location text.
pub fn detect_remote_type(location: &str) -> Option<RemoteType> {
    let lower = location.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    if lower.contains("remote") {
        Some(RemoteType::Remote)
    } else if lower.contains("hybrid") {
        Some(RemoteType::Hybrid)
    } else {
        Some(RemoteType::Onsite)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
