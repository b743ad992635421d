// ============================================
// Candidate Query Construction
// ============================================
//
// Coarse, store-level selection of scoring candidates.
// The store returns up to `fetch_limit` records; precise scoring
// happens in-process afterwards.

use crate::models::{
    ContentKey, ContentMetadata, ContentType, ContentTypeFilter, Difficulty, Language,
    UserPreferences,
};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Over-fetch factor for related content
pub const RELATED_OVERFETCH_FACTOR: usize = 2;

/// Over-fetch factor for personalized recommendations. Larger than the
/// related factor because penalties can invert the store ordering.
pub const PERSONALIZED_OVERFETCH_FACTOR: usize = 3;

/// Ratio between the candidate fetch limit and the final result limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverFetch(usize);

impl OverFetch {
    /// Factors below 1 are raised to 1
    pub fn new(factor: usize) -> Self {
        Self(factor.max(1))
    }

    pub fn related() -> Self {
        Self::new(RELATED_OVERFETCH_FACTOR)
    }

    pub fn personalized() -> Self {
        Self::new(PERSONALIZED_OVERFETCH_FACTOR)
    }

    pub fn factor(&self) -> usize {
        self.0
    }

    pub fn fetch_limit(&self, limit: usize) -> usize {
        limit.saturating_mul(self.0)
    }
}

/// Ordering the store should apply before truncating to `fetch_limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortHint {
    Unordered,
    /// `popularity_score DESC, quality_score DESC`
    PopularityThenQuality,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CandidateFilter {
    /// Anything sharing at least one signal with the source, except the source.
    /// With no populated signal this matches every other record.
    Related {
        exclude: ContentKey,
        techniques: Vec<String>,
        difficulty: Option<Difficulty>,
        keywords: Vec<String>,
        tags: Vec<String>,
    },
    Personalized {
        content_type: Option<ContentType>,
        difficulty: Option<Difficulty>,
        /// `None` accepts every language
        languages: Option<Vec<Language>>,
    },
}

impl CandidateFilter {
    pub fn related(source: &ContentMetadata) -> Self {
        Self::Related {
            exclude: source.key(),
            techniques: source.techniques.clone(),
            difficulty: source.difficulty,
            keywords: source.keywords.clone(),
            tags: source.tags.clone(),
        }
    }

    pub fn personalized(preferences: &UserPreferences, content_type: ContentTypeFilter) -> Self {
        let languages = match preferences.preferred_language {
            Language::Both => None,
            preferred => Some(vec![preferred, Language::Both]),
        };

        Self::Personalized {
            content_type: content_type.as_content_type(),
            difficulty: preferences.difficulty_level.as_difficulty(),
            languages,
        }
    }

    /// In-process evaluation of the filter
    pub fn matches(&self, metadata: &ContentMetadata) -> bool {
        match self {
            Self::Related {
                exclude,
                techniques,
                difficulty,
                keywords,
                tags,
            } => {
                if metadata.key() == *exclude {
                    return false;
                }

                let has_signal = !techniques.is_empty()
                    || difficulty.is_some()
                    || !keywords.is_empty()
                    || !tags.is_empty();
                if !has_signal {
                    return true;
                }

                overlaps(techniques, &metadata.techniques)
                    || (difficulty.is_some() && *difficulty == metadata.difficulty)
                    || overlaps(keywords, &metadata.keywords)
                    || overlaps(tags, &metadata.tags)
            }
            Self::Personalized {
                content_type,
                difficulty,
                languages,
            } => {
                content_type.map_or(true, |t| t == metadata.content_type)
                    && difficulty.map_or(true, |d| Some(d) == metadata.difficulty)
                    && languages
                        .as_ref()
                        .map_or(true, |langs| langs.contains(&metadata.language))
            }
        }
    }
}

/// A store query: filter, ordering and fetch cap
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    pub filter: CandidateFilter,
    pub sort: SortHint,
    pub fetch_limit: usize,
}

impl CandidateQuery {
    pub fn related(source: &ContentMetadata, limit: usize, over_fetch: OverFetch) -> Self {
        Self {
            filter: CandidateFilter::related(source),
            sort: SortHint::Unordered,
            fetch_limit: over_fetch.fetch_limit(limit),
        }
    }

    pub fn personalized(
        preferences: &UserPreferences,
        content_type: ContentTypeFilter,
        limit: usize,
        over_fetch: OverFetch,
    ) -> Self {
        Self {
            filter: CandidateFilter::personalized(preferences, content_type),
            sort: SortHint::PopularityThenQuality,
            fetch_limit: over_fetch.fetch_limit(limit),
        }
    }
}

impl SortHint {
    /// Comparator matching the store-level ordering
    pub fn compare(&self, a: &ContentMetadata, b: &ContentMetadata) -> Ordering {
        match self {
            Self::Unordered => Ordering::Equal,
            Self::PopularityThenQuality => b
                .popularity_score
                .total_cmp(&a.popularity_score)
                .then_with(|| b.quality_score.total_cmp(&a.quality_score)),
        }
    }
}

fn overlaps(wanted: &[String], present: &[String]) -> bool {
    if wanted.is_empty() || present.is_empty() {
        return false;
    }
    let wanted: HashSet<&str> = wanted.iter().map(String::as_str).collect();
    present.iter().any(|p| wanted.contains(p.as_str()))
}
