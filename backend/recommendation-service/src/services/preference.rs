// ============================================
// Preference Scorer (personalized recommendations)
// ============================================
//
// Additive score over quality, popularity, favorite techniques and recency,
// minus penalties for content the user already viewed, bookmarked or
// queued for later.

use super::ranking::{intersection_count, rank_and_truncate};
use super::weights::PreferenceWeights;
use crate::models::{
    ContentMetadata, ContentType, InteractionHistory, ScoredCandidate, UserPreferences,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub struct PreferenceScorer {
    weights: PreferenceWeights,
}

impl Default for PreferenceScorer {
    fn default() -> Self {
        Self::new(PreferenceWeights::default())
    }
}

impl PreferenceScorer {
    pub fn new(weights: PreferenceWeights) -> Self {
        Self { weights }
    }

    /// Rank `pool` for a user as of `now`
    pub fn score_preferences(
        &self,
        preferences: &UserPreferences,
        interactions: &InteractionHistory,
        pool: Vec<ContentMetadata>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Vec<ScoredCandidate> {
        let input_count = pool.len();

        let scored: Vec<ScoredCandidate> = pool
            .into_iter()
            .map(|candidate| {
                let score = self.score(preferences, interactions, &candidate, now);
                ScoredCandidate::new(candidate, score)
            })
            .collect();

        let ranked = rank_and_truncate(scored, limit);

        info!(
            input_count = input_count,
            output_count = ranked.len(),
            "Personalized content scored"
        );

        ranked
    }

    pub fn score(
        &self,
        preferences: &UserPreferences,
        interactions: &InteractionHistory,
        candidate: &ContentMetadata,
        now: DateTime<Utc>,
    ) -> f64 {
        let w = &self.weights;

        let mut score =
            candidate.quality_score * w.quality + candidate.popularity_score * w.popularity;

        if !preferences.favorite_categories.is_empty() {
            score += w.favorite_categories_bonus;
        }

        let favorite_matches =
            intersection_count(&candidate.techniques, &preferences.favorite_techniques);
        score += favorite_matches as f64 * w.favorite_technique;

        score += self.recency_bonus(candidate.created_at, now);

        match candidate.content_type {
            ContentType::Course => {
                if interactions.viewed_course_ids.contains(&candidate.content_id) {
                    score -= w.viewed_course_penalty;
                }
            }
            ContentType::Article => {
                if interactions.bookmarked_article_ids.contains(&candidate.content_id) {
                    score -= w.bookmarked_penalty;
                }
                if interactions.read_later_article_ids.contains(&candidate.content_id) {
                    score -= w.read_later_penalty;
                }
            }
            ContentType::Artwork => {}
        }

        debug!(
            content_id = %candidate.content_id,
            content_type = %candidate.content_type,
            favorite_matches = favorite_matches,
            score = score,
            "Preference score computed"
        );

        score
    }

    /// Exactly one bucket applies; each upper bound is exclusive
    pub fn recency_bonus(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let age_days = (now - created_at).num_milliseconds() as f64 / MILLIS_PER_DAY;

        if age_days < 7.0 {
            self.weights.recency_week
        } else if age_days < 30.0 {
            self.weights.recency_month
        } else if age_days < 90.0 {
            self.weights.recency_quarter
        } else {
            0.0
        }
    }
}
