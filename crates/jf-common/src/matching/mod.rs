//! Feed assembly: preference learning, candidate retrieval with a
//! deterministic fallback, scoring, and ranking.

pub mod engine;
pub mod scoring;

pub use engine::{MatchError, MatchingEngine};
pub use scoring::{score_job, CHEMISTRY_CEILING, CHEMISTRY_FLOOR, GENERIC_REASON, WEIGHTS};
