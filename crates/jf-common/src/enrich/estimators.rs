//! Pluggable estimators for fields with no real upstream data source yet.
//!
//! Each estimator is deterministic: the same listing always produces the same
//! value, and every value stays inside the documented range so downstream
//! scoring never dereferences missing data. Defaults derive pseudo-values
//! from a fixed-seed SipHash13 of the canonical key; swapping in a real data
//! source is a matter of providing another implementation.

use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

use crate::{canonical_key, GrowthData, LifestyleData, NetworkData, RawListing, SalaryEstimate};

const ESTIMATOR_SEED_K0: u64 = 0xc2b2_ae3d_27d4_eb4f;
const ESTIMATOR_SEED_K1: u64 = 0x1656_67b1_9e37_79f9;

pub trait SalaryEstimator: Send + Sync {
    /// Annual USD figures; `base` stays within 40_000..=200_000.
    fn estimate(&self, listing: &RawListing) -> SalaryEstimate;
}

pub trait LifestyleEstimator: Send + Sync {
    /// Both scores stay within 1.0..=10.0.
    fn estimate(&self, listing: &RawListing) -> LifestyleData;
}

pub trait NetworkEstimator: Send + Sync {
    /// `alumni_count` stays within 0..=25.
    fn estimate(&self, listing: &RawListing) -> NetworkData;
}

pub trait GrowthEstimator: Send + Sync {
    /// `headcount_growth_pct` stays within 0.0..=40.0.
    fn estimate(&self, listing: &RawListing) -> GrowthData;
}

/// Bundle handed to the enrichment service.
pub struct Estimators {
    pub salary: Box<dyn SalaryEstimator>,
    pub lifestyle: Box<dyn LifestyleEstimator>,
    pub network: Box<dyn NetworkEstimator>,
    pub growth: Box<dyn GrowthEstimator>,
}

impl Default for Estimators {
    fn default() -> Self {
        Self {
            salary: Box::new(HeuristicSalaryEstimator),
            lifestyle: Box::new(HeuristicLifestyleEstimator),
            network: Box::new(HeuristicNetworkEstimator),
            growth: Box::new(HeuristicGrowthEstimator),
        }
    }
}

/// Fraction in [0.0, 1.0) derived from the listing key and a per-field salt.
fn seeded_fraction(listing: &RawListing, salt: &str) -> f64 {
    let mut hasher = SipHasher13::new_with_keys(ESTIMATOR_SEED_K0, ESTIMATOR_SEED_K1);
    canonical_key(&listing.company, &listing.title, Some(&listing.location)).hash(&mut hasher);
    salt.hash(&mut hasher);
    (hasher.finish() >> 11) as f64 / (1u64 << 53) as f64
}

pub struct HeuristicSalaryEstimator;

impl SalaryEstimator for HeuristicSalaryEstimator {
    fn estimate(&self, listing: &RawListing) -> SalaryEstimate {
        let title = listing.title.to_lowercase();
        let (lo, hi) = if title.contains("intern") {
            (40_000u32, 70_000u32)
        } else if title.contains("senior") || title.contains("staff") || title.contains("lead") {
            (130_000, 200_000)
        } else {
            (70_000, 140_000)
        };

        let span = (hi - lo) as f64;
        let raw = lo as f64 + seeded_fraction(listing, "salary") * span;
        // Round to the nearest $1k so repeated runs render identically.
        let base = ((raw / 1_000.0).round() as u32) * 1_000;
        let bonus = base / 10;

        SalaryEstimate {
            base,
            bonus,
            total: base + bonus,
            benefits: vec![
                "health insurance".to_string(),
                "401k match".to_string(),
                "paid time off".to_string(),
            ],
        }
    }
}

pub struct HeuristicLifestyleEstimator;

impl LifestyleEstimator for HeuristicLifestyleEstimator {
    fn estimate(&self, listing: &RawListing) -> LifestyleData {
        LifestyleData {
            work_life_balance: scaled_score(seeded_fraction(listing, "wlb")),
            culture_score: scaled_score(seeded_fraction(listing, "culture")),
        }
    }
}

pub struct HeuristicNetworkEstimator;

impl NetworkEstimator for HeuristicNetworkEstimator {
    fn estimate(&self, listing: &RawListing) -> NetworkData {
        let alumni_count = (seeded_fraction(listing, "alumni") * 26.0) as u32;
        NetworkData {
            alumni_count: alumni_count.min(25),
            mutual_connections: (seeded_fraction(listing, "mutual") * 11.0) as u32,
        }
    }
}

pub struct HeuristicGrowthEstimator;

impl GrowthEstimator for HeuristicGrowthEstimator {
    fn estimate(&self, listing: &RawListing) -> GrowthData {
        GrowthData {
            headcount_growth_pct: (seeded_fraction(listing, "growth") * 40.0) as f32,
            promotion_velocity: scaled_score(seeded_fraction(listing, "promotion")),
        }
    }
}

/// Map [0,1) onto 1.0..=10.0 with one decimal of precision.
fn scaled_score(fraction: f64) -> f32 {
    ((1.0 + fraction * 9.0) * 10.0).round() as f32 / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(company: &str, title: &str) -> RawListing {
        RawListing {
            company: company.into(),
            title: title.into(),
            location: "Remote".into(),
            apply_url: "https://example.com/apply".into(),
        }
    }

    #[test]
    fn estimates_are_deterministic_per_listing() {
        let l = listing("Acme", "Software Engineer");
        let est = Estimators::default();

        assert_eq!(est.salary.estimate(&l), est.salary.estimate(&l));
        assert_eq!(est.lifestyle.estimate(&l), est.lifestyle.estimate(&l));
        assert_eq!(est.network.estimate(&l), est.network.estimate(&l));
        assert_eq!(est.growth.estimate(&l), est.growth.estimate(&l));
    }

    #[test]
    fn salary_respects_title_bands() {
        let est = HeuristicSalaryEstimator;

        let intern = est.estimate(&listing("Acme", "Software Engineer Intern"));
        assert!((40_000..=70_000).contains(&intern.base));

        let senior = est.estimate(&listing("Acme", "Senior Backend Engineer"));
        assert!((130_000..=200_000).contains(&senior.base));

        let mid = est.estimate(&listing("Acme", "Backend Engineer"));
        assert!((70_000..=140_000).contains(&mid.base));
        assert_eq!(mid.total, mid.base + mid.bonus);
        assert!(!mid.benefits.is_empty());
    }

    #[test]
    fn scores_stay_inside_documented_ranges() {
        for company in ["Acme", "Globex", "Initech", "Umbrella", "Hooli"] {
            let l = listing(company, "Engineer");
            let lifestyle = HeuristicLifestyleEstimator.estimate(&l);
            assert!((1.0..=10.0).contains(&lifestyle.work_life_balance));
            assert!((1.0..=10.0).contains(&lifestyle.culture_score));

            let network = HeuristicNetworkEstimator.estimate(&l);
            assert!(network.alumni_count <= 25);

            let growth = HeuristicGrowthEstimator.estimate(&l);
            assert!((0.0..=40.0).contains(&growth.headcount_growth_pct));
            assert!((1.0..=10.0).contains(&growth.promotion_velocity));
        }
    }
}
