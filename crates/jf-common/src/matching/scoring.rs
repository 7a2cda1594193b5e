//! Six-factor weighted scoring. Each sub-score sits on a nominal 0-100
//! scale and the combined chemistry score is clamped to 65..=95.

use crate::{JobRecord, PreferenceProfile, ScoredJob, SubScores};

#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub semantic: f64,
    pub salary: f64,
    pub location: f64,
    pub industry: f64,
    pub network: f64,
    pub behavioral: f64,
}

pub const WEIGHTS: ScoreWeights = ScoreWeights {
    semantic: 0.40,
    salary: 0.20,
    location: 0.15,
    industry: 0.15,
    network: 0.05,
    behavioral: 0.05,
};

pub const CHEMISTRY_FLOOR: f64 = 65.0;
pub const CHEMISTRY_CEILING: f64 = 95.0;

/// Fallback reason when nothing specific applies.
pub const GENERIC_REASON: &str = "Great opportunity for growth";

const MAX_REASONS: usize = 3;

/// Score one candidate. `semantic` comes from vector similarity (or the
/// configured neutral value on the fallback path).
pub fn score_job(job: JobRecord, profile: &PreferenceProfile, semantic: f64) -> ScoredJob {
    let scores = SubScores {
        semantic,
        salary: score_salary(&job, profile),
        location: score_location(&job, profile),
        industry: score_industry(&job, profile),
        network: score_network(&job),
        behavioral: score_behavioral(&job, profile),
    };

    let weighted = scores.semantic * WEIGHTS.semantic
        + scores.salary * WEIGHTS.salary
        + scores.location * WEIGHTS.location
        + scores.industry * WEIGHTS.industry
        + scores.network * WEIGHTS.network
        + scores.behavioral * WEIGHTS.behavioral;

    let chemistry = weighted.clamp(CHEMISTRY_FLOOR, CHEMISTRY_CEILING);
    let reasons = build_reasons(&job, profile, &scores);

    ScoredJob {
        job,
        scores,
        chemistry,
        reasons,
    }
}

fn score_salary(job: &JobRecord, profile: &PreferenceProfile) -> f64 {
    let Some(salary) = &job.salary else {
        return 50.0;
    };

    let base = salary.base as f64;
    let target = profile.salary_min as f64;

    if base >= target * 1.2 {
        100.0
    } else if base >= target {
        80.0
    } else if base >= target * 0.8 {
        60.0
    } else {
        30.0
    }
}

fn score_location(job: &JobRecord, profile: &PreferenceProfile) -> f64 {
    let Some(location) = &job.location else {
        return 50.0;
    };

    if profile.location_preference.is_empty() {
        return 70.0;
    }

    let haystack = location.to_lowercase();
    let matched = profile
        .location_preference
        .iter()
        .any(|preferred| haystack.contains(&preferred.to_lowercase()));

    if matched {
        90.0
    } else {
        40.0
    }
}

fn score_industry(job: &JobRecord, profile: &PreferenceProfile) -> f64 {
    let Some(industry) = &job.industry else {
        return 50.0;
    };

    if profile.preferred_industries.is_empty() {
        70.0
    } else if profile.preferred_industries.contains(industry) {
        90.0
    } else {
        40.0
    }
}

/// Flat 20/0 on a nominal 0-100 scale, folded straight into the weighted
/// sum. Known quirk carried over intact; at 5% weight the term is nearly
/// negligible, and whether it should be rescaled is a product question.
fn score_network(job: &JobRecord) -> f64 {
    match &job.network {
        Some(network) if network.alumni_count > 0 => 20.0,
        _ => 0.0,
    }
}

fn score_behavioral(job: &JobRecord, profile: &PreferenceProfile) -> f64 {
    if company_overlaps_liked(job, profile) {
        85.0
    } else {
        50.0
    }
}

/// Textual overlap in either substring direction, case-insensitive.
fn company_overlaps_liked(job: &JobRecord, profile: &PreferenceProfile) -> bool {
    let company = job.company.to_lowercase();
    profile.liked_companies.iter().any(|liked| {
        let liked = liked.to_lowercase();
        company.contains(&liked) || liked.contains(&company)
    })
}

/// Up to three reasons in fixed priority order: network presence, industry
/// match, company similarity, salary match, then the generic fallback.
fn build_reasons(job: &JobRecord, profile: &PreferenceProfile, scores: &SubScores) -> Vec<String> {
    let mut reasons = Vec::new();

    if scores.network > 0.0 {
        reasons.push("Alumni connections at this company".to_string());
    }
    if let Some(industry) = &job.industry {
        if profile.preferred_industries.contains(industry) {
            reasons.push(format!("Matches your interest in {industry}"));
        }
    }
    if company_overlaps_liked(job, profile) {
        reasons.push("Similar to companies you've liked".to_string());
    }
    if let Some(salary) = &job.salary {
        if salary.base >= profile.salary_min {
            reasons.push("Salary meets your target".to_string());
        }
    }

    if reasons.is_empty() {
        reasons.push(GENERIC_REASON.to_string());
    }

    reasons.truncate(MAX_REASONS);
    reasons
}
