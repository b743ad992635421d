use serde::{Deserialize, Serialize};

/// Weights for related-content scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceWeights {
    /// Points per technique shared with the source
    pub shared_technique: f64,
    /// Points per keyword shared with the source
    pub shared_keyword: f64,
    /// Points per tag shared with the source
    pub shared_tag: f64,
    /// Flat bonus when difficulty matches the source
    pub same_difficulty: f64,
    /// Whether two items that both lack a difficulty count as matching
    pub match_unset_difficulty: bool,
    /// Affinity for candidates of the source's content type; applied as `1 + affinity`
    pub same_type_affinity: f64,
    /// Affinity for candidates of a different content type
    pub cross_type_affinity: f64,
    pub quality: f64,
    pub popularity: f64,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            shared_technique: 20.0,
            shared_keyword: 15.0,
            shared_tag: 10.0,
            same_difficulty: 10.0,
            match_unset_difficulty: true,
            same_type_affinity: 0.7,
            cross_type_affinity: 0.3,
            quality: 0.2,
            popularity: 0.1,
        }
    }
}

/// Weights for personalized scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceWeights {
    pub quality: f64,
    pub popularity: f64,
    /// Flat bonus applied whenever the user has any favorite category.
    /// Metadata carries no category, so this never matches per item.
    /// Set to 0 to disable.
    pub favorite_categories_bonus: f64,
    /// Points per candidate technique found in the user's favorites
    pub favorite_technique: f64,
    /// Bonus for content younger than 7 days
    pub recency_week: f64,
    /// Bonus for content younger than 30 days
    pub recency_month: f64,
    /// Bonus for content younger than 90 days
    pub recency_quarter: f64,
    pub viewed_course_penalty: f64,
    pub bookmarked_penalty: f64,
    pub read_later_penalty: f64,
}

impl Default for PreferenceWeights {
    fn default() -> Self {
        Self {
            quality: 0.3,
            popularity: 0.2,
            favorite_categories_bonus: 10.0,
            favorite_technique: 5.0,
            recency_week: 15.0,
            recency_month: 10.0,
            recency_quarter: 5.0,
            viewed_course_penalty: 50.0,
            bookmarked_penalty: 30.0,
            read_later_penalty: 20.0,
        }
    }
}

/// All scoring weights, passed into the scorers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub relevance: RelevanceWeights,
    pub preference: PreferenceWeights,
}
