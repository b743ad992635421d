// ============================================
// Recommendation Engine
// ============================================
//
// Related:      source metadata → related query (2x) → relevance score → rank
// Personalized: preferences + history → personalized query (3x) → preference score → rank
//
// Scoring is pure; hydration is a separate async stage.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use super::candidates::{CandidateQuery, OverFetch};
use super::hydration;
use super::preference::PreferenceScorer;
use super::relevance::RelevanceScorer;
use crate::config::RecommendationConfig;
use crate::db::{ContentResolver, InteractionStore, MetadataStore, PreferenceStore};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{
    ContentType, ContentTypeFilter, HydratedCandidate, InteractionHistory, ScoredCandidate,
};

const MODE_RELATED: &str = "related";
const MODE_PERSONALIZED: &str = "personalized";

pub struct RecommendationEngine {
    metadata: Arc<dyn MetadataStore>,
    preferences: Arc<dyn PreferenceStore>,
    interactions: Arc<dyn InteractionStore>,
    resolver: Arc<dyn ContentResolver>,
    relevance: RelevanceScorer,
    preference: PreferenceScorer,
    related_over_fetch: OverFetch,
    personalized_over_fetch: OverFetch,
    hydration_concurrency: usize,
}

impl RecommendationEngine {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        preferences: Arc<dyn PreferenceStore>,
        interactions: Arc<dyn InteractionStore>,
        resolver: Arc<dyn ContentResolver>,
        config: &RecommendationConfig,
    ) -> Self {
        Self {
            metadata,
            preferences,
            interactions,
            resolver,
            relevance: RelevanceScorer::new(config.weights.relevance.clone()),
            preference: PreferenceScorer::new(config.weights.preference.clone()),
            related_over_fetch: OverFetch::new(config.related_overfetch_factor),
            personalized_over_fetch: OverFetch::new(config.personalized_overfetch_factor),
            hydration_concurrency: config.hydration_concurrency,
        }
    }

    /// Content related to the given item, best match first.
    ///
    /// Unknown source content yields an empty list.
    pub async fn related(
        &self,
        content_id: Uuid,
        content_type: ContentType,
        limit: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        let result = self.related_inner(content_id, content_type, limit).await;
        record_outcome(MODE_RELATED, &result);
        result
    }

    async fn related_inner(
        &self,
        content_id: Uuid,
        content_type: ContentType,
        limit: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let started = Instant::now();

        let source = self
            .metadata
            .find_metadata(content_id, content_type)
            .await
            .map_err(unavailable)?;

        let Some(source) = source else {
            info!(
                content_id = %content_id,
                content_type = %content_type,
                "No metadata for source content, returning no related items"
            );
            return Ok(Vec::new());
        };

        let query = CandidateQuery::related(&source, limit, self.related_over_fetch);
        let pool = self
            .metadata
            .find_candidates(&query)
            .await
            .map_err(unavailable)?;

        metrics::record_candidates_fetched(MODE_RELATED, pool.len());
        metrics::record_stage_duration(MODE_RELATED, "fetch", started.elapsed());

        let scoring_started = Instant::now();
        let ranked = self.relevance.score_related(&source, pool, limit);
        metrics::record_stage_duration(MODE_RELATED, "score", scoring_started.elapsed());

        Ok(ranked)
    }

    /// Personalized recommendations for a user, best match first.
    ///
    /// Preferences are created with defaults on first access.
    pub async fn personalized(
        &self,
        user_id: Uuid,
        content_type: ContentTypeFilter,
        limit: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        let result = self.personalized_inner(user_id, content_type, limit).await;
        record_outcome(MODE_PERSONALIZED, &result);
        result
    }

    async fn personalized_inner(
        &self,
        user_id: Uuid,
        content_type: ContentTypeFilter,
        limit: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let started = Instant::now();

        let preferences = self
            .preferences
            .get_or_create_preferences(user_id)
            .await
            .map_err(unavailable)?;

        let (viewed_course_ids, bookmarked_article_ids, read_later_article_ids) = tokio::try_join!(
            self.interactions.viewed_course_ids(user_id),
            self.interactions.bookmarked_article_ids(user_id),
            self.interactions.read_later_article_ids(user_id),
        )
        .map_err(unavailable)?;

        let history = InteractionHistory {
            viewed_course_ids,
            bookmarked_article_ids,
            read_later_article_ids,
        };

        let query = CandidateQuery::personalized(
            &preferences,
            content_type,
            limit,
            self.personalized_over_fetch,
        );
        let pool = self
            .metadata
            .find_candidates(&query)
            .await
            .map_err(unavailable)?;

        metrics::record_candidates_fetched(MODE_PERSONALIZED, pool.len());
        metrics::record_stage_duration(MODE_PERSONALIZED, "fetch", started.elapsed());

        let scoring_started = Instant::now();
        let ranked =
            self.preference
                .score_preferences(&preferences, &history, pool, limit, Utc::now());
        metrics::record_stage_duration(MODE_PERSONALIZED, "score", scoring_started.elapsed());

        info!(
            user_id = %user_id,
            content_type = %content_type,
            output_count = ranked.len(),
            "Personalized recommendations ready"
        );

        Ok(ranked)
    }

    /// Resolve ranked candidates into their full documents, keeping order
    pub async fn hydrate(&self, ranked: Vec<ScoredCandidate>) -> Result<Vec<HydratedCandidate>> {
        let started = Instant::now();
        let hydrated =
            hydration::hydrate(self.resolver.as_ref(), ranked, self.hydration_concurrency)
                .await
                .map_err(unavailable)?;
        metrics::record_stage_duration("hydration", "hydrate", started.elapsed());
        Ok(hydrated)
    }
}

/// Collaborator failures are reported as unavailable, never as an empty result
fn unavailable(err: AppError) -> AppError {
    match err {
        AppError::RecommendationUnavailable(_) => err,
        other => {
            warn!(error = %other, "Recommendation collaborator failed");
            AppError::RecommendationUnavailable(other.to_string())
        }
    }
}

fn record_outcome(mode: &str, result: &Result<Vec<ScoredCandidate>>) {
    let outcome = match result {
        Ok(items) if items.is_empty() => "empty",
        Ok(_) => "ok",
        Err(_) => "error",
    };
    metrics::record_request(mode, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InMemoryStore, MockInteractionStore, MockMetadataStore, MockPreferenceStore};
    use crate::models::{ContentMetadata, Language, UserPreferences};
    use std::collections::HashSet;

    fn metadata(content_type: ContentType, techniques: &[&str]) -> ContentMetadata {
        ContentMetadata {
            content_id: Uuid::new_v4(),
            content_type,
            difficulty: None,
            language: Language::Fa,
            techniques: techniques.iter().map(|t| t.to_string()).collect(),
            keywords: Vec::new(),
            tags: Vec::new(),
            quality_score: 0.0,
            popularity_score: 0.0,
            created_at: Utc::now(),
        }
    }

    fn engine_over(store: Arc<InMemoryStore>) -> RecommendationEngine {
        RecommendationEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            &RecommendationConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_related_unknown_source_is_empty() {
        let engine = engine_over(Arc::new(InMemoryStore::new()));

        let related = engine
            .related(Uuid::new_v4(), ContentType::Article, 5)
            .await
            .unwrap();

        assert!(related.is_empty());
    }

    #[tokio::test]
    async fn test_related_fetches_twice_the_limit() {
        let source = metadata(ContentType::Article, &["A"]);
        let source_clone = source.clone();

        let mut store = MockMetadataStore::new();
        store
            .expect_find_metadata()
            .returning(move |_, _| Ok(Some(source_clone.clone())));
        store
            .expect_find_candidates()
            .withf(|query| query.fetch_limit == 8)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let memory = Arc::new(InMemoryStore::new());
        let engine = RecommendationEngine::new(
            Arc::new(store),
            memory.clone(),
            memory.clone(),
            memory,
            &RecommendationConfig::default(),
        );

        let related = engine
            .related(source.content_id, source.content_type, 4)
            .await
            .unwrap();
        assert!(related.is_empty());
    }

    #[tokio::test]
    async fn test_related_store_failure_is_unavailable() {
        let mut store = MockMetadataStore::new();
        store
            .expect_find_metadata()
            .returning(|_, _| Err(AppError::Database("timeout".into())));

        let memory = Arc::new(InMemoryStore::new());
        let engine = RecommendationEngine::new(
            Arc::new(store),
            memory.clone(),
            memory.clone(),
            memory,
            &RecommendationConfig::default(),
        );

        let result = engine.related(Uuid::new_v4(), ContentType::Course, 5).await;
        assert!(matches!(result, Err(AppError::RecommendationUnavailable(_))));
    }

    #[tokio::test]
    async fn test_personalized_fetches_three_times_the_limit() {
        let mut store = MockMetadataStore::new();
        store
            .expect_find_candidates()
            .withf(|query| query.fetch_limit == 15)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let memory = Arc::new(InMemoryStore::new());
        let engine = RecommendationEngine::new(
            Arc::new(store),
            memory.clone(),
            memory.clone(),
            memory,
            &RecommendationConfig::default(),
        );

        let ranked = engine
            .personalized(Uuid::new_v4(), ContentTypeFilter::All, 5)
            .await
            .unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_personalized_interaction_failure_is_unavailable() {
        let mut interactions = MockInteractionStore::new();
        interactions
            .expect_viewed_course_ids()
            .returning(|_| Err(AppError::Database("connection refused".into())));
        interactions
            .expect_bookmarked_article_ids()
            .returning(|_| Ok(HashSet::new()));
        interactions
            .expect_read_later_article_ids()
            .returning(|_| Ok(HashSet::new()));

        let mut preferences = MockPreferenceStore::new();
        preferences
            .expect_get_or_create_preferences()
            .returning(|_| Ok(UserPreferences::default()));

        let memory = Arc::new(InMemoryStore::new());
        let engine = RecommendationEngine::new(
            memory.clone(),
            Arc::new(preferences),
            Arc::new(interactions),
            memory,
            &RecommendationConfig::default(),
        );

        let result = engine
            .personalized(Uuid::new_v4(), ContentTypeFilter::Course, 5)
            .await;
        assert!(matches!(result, Err(AppError::RecommendationUnavailable(_))));
    }

    #[tokio::test]
    async fn test_zero_limit_skips_stores() {
        let engine = RecommendationEngine::new(
            Arc::new(MockMetadataStore::new()),
            Arc::new(MockPreferenceStore::new()),
            Arc::new(MockInteractionStore::new()),
            Arc::new(InMemoryStore::new()),
            &RecommendationConfig::default(),
        );

        assert!(engine
            .related(Uuid::new_v4(), ContentType::Article, 0)
            .await
            .unwrap()
            .is_empty());
        assert!(engine
            .personalized(Uuid::new_v4(), ContentTypeFilter::All, 0)
            .await
            .unwrap()
            .is_empty());
    }
}
