//! Content recommendation services
//!
//! Two-stage pipeline: pure scoring over store candidates, then
//! async hydration of the ranked slice.

pub mod candidates;
pub mod engine;
pub mod hydration;
pub mod preference;
pub mod ranking;
pub mod relevance;
pub mod weights;

pub use candidates::{CandidateFilter, CandidateQuery, OverFetch, SortHint};
pub use engine::RecommendationEngine;
pub use preference::PreferenceScorer;
pub use relevance::RelevanceScorer;
pub use weights::{PreferenceWeights, RelevanceWeights, ScoringWeights};
