//! Derives a preference profile from a user's swipe history.
//!
//! A pure fold over the event log: re-running on the same log yields the
//! same profile. `like` and `apply` accumulate positively, `pass`
//! negatively; `save` is recorded upstream but deliberately touches no
//! profile field.

use std::collections::HashMap;

use crate::{JobRecord, PreferenceProfile, SwipeAction, SwipeEvent};

/// Salary floor applied when no positive-signal job carries a known salary.
pub const DEFAULT_SALARY_MIN: u32 = 60_000;

/// Target salary is set below the observed average so near-miss listings
/// still surface.
const SALARY_DISCOUNT: f64 = 0.8;

const MAX_LOCATION_PREFERENCES: usize = 3;

pub fn learn_preferences(
    events: &[SwipeEvent],
    jobs: &HashMap<String, JobRecord>,
) -> PreferenceProfile {
    let mut profile = PreferenceProfile::default();

    let mut salary_bases: Vec<u32> = Vec::new();
    // location / work-style frequency with first-seen order for stable ties
    let mut location_counts: Vec<(String, usize)> = Vec::new();
    let mut style_counts: Vec<(&'static str, usize)> = Vec::new();

    for event in events {
        let Some(job) = jobs.get(&event.job_id) else {
            continue;
        };

        match event.action {
            SwipeAction::Pass => {
                profile.disliked_companies.insert(job.company.clone());
            }
            SwipeAction::Save => {
                // Recorded, never accumulated.
            }
            SwipeAction::Like | SwipeAction::Apply => {
                profile.liked_companies.insert(job.company.clone());

                if let Some(industry) = &job.industry {
                    profile.preferred_industries.insert(industry.clone());
                }
                if let Some(salary) = &job.salary {
                    salary_bases.push(salary.base);
                }
                if let Some(location) = &job.location {
                    bump(&mut location_counts, location.clone());
                }
                if let Some(style) = job.remote_type {
                    bump(&mut style_counts, style.as_str());
                }
            }
        }
    }

    if !salary_bases.is_empty() {
        let mean = salary_bases.iter().map(|b| *b as f64).sum::<f64>() / salary_bases.len() as f64;
        profile.salary_min = (mean * SALARY_DISCOUNT).round() as u32;
    }

    profile.location_preference = top_by_count(location_counts, MAX_LOCATION_PREFERENCES);

    if let Some(style) = top_by_count(style_counts, 1).into_iter().next() {
        profile.work_style = style.to_string();
    }

    profile
}

fn bump<K: PartialEq>(counts: &mut Vec<(K, usize)>, key: K) {
    if let Some(entry) = counts.iter_mut().find(|(k, _)| *k == key) {
        entry.1 += 1;
    } else {
        counts.push((key, 1));
    }
}

/// Highest count first; ties keep first-seen order (stable sort).
fn top_by_count<K>(mut counts: Vec<(K, usize)>, limit: usize) -> Vec<K> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(k, _)| k).collect()
}
