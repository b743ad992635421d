use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use uuid::Uuid;

use super::{ContentResolver, InteractionStore, MetadataStore, PreferenceStore};
use crate::error::Result;
use crate::models::{
    ContentKey, ContentMetadata, ContentType, InteractionHistory, UserPreferences,
};
use crate::services::candidates::CandidateQuery;

/// In-memory implementation of every store
#[derive(Default)]
pub struct InMemoryStore {
    metadata: DashMap<ContentKey, ContentMetadata>,
    preferences: DashMap<Uuid, UserPreferences>,
    interactions: DashMap<Uuid, InteractionHistory>,
    documents: DashMap<ContentKey, serde_json::Value>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the metadata for its key
    pub fn upsert_metadata(&self, metadata: ContentMetadata) {
        self.metadata.insert(metadata.key(), metadata);
    }

    pub fn set_preferences(&self, user_id: Uuid, preferences: UserPreferences) {
        self.preferences.insert(user_id, preferences);
    }

    pub fn set_interactions(&self, user_id: Uuid, history: InteractionHistory) {
        self.interactions.insert(user_id, history);
    }

    pub fn insert_document(&self, key: ContentKey, document: serde_json::Value) {
        self.documents.insert(key, document);
    }

    fn history_ids(
        &self,
        user_id: Uuid,
        select: impl Fn(&InteractionHistory) -> &HashSet<Uuid>,
    ) -> HashSet<Uuid> {
        self.interactions
            .get(&user_id)
            .map(|h| select(h.value()).clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MetadataStore for InMemoryStore {
    async fn find_metadata(
        &self,
        content_id: Uuid,
        content_type: ContentType,
    ) -> Result<Option<ContentMetadata>> {
        Ok(self
            .metadata
            .get(&ContentKey::new(content_id, content_type))
            .map(|entry| entry.value().clone()))
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<ContentMetadata>> {
        let mut matched: Vec<ContentMetadata> = self
            .metadata
            .iter()
            .filter(|entry| query.filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matched.sort_by(|a, b| query.sort.compare(a, b));
        matched.truncate(query.fetch_limit);
        Ok(matched)
    }
}

#[async_trait]
impl PreferenceStore for InMemoryStore {
    async fn get_preferences(&self, user_id: Uuid) -> Result<Option<UserPreferences>> {
        Ok(self.preferences.get(&user_id).map(|p| p.value().clone()))
    }

    async fn get_or_create_preferences(&self, user_id: Uuid) -> Result<UserPreferences> {
        Ok(self
            .preferences
            .entry(user_id)
            .or_default()
            .value()
            .clone())
    }
}

#[async_trait]
impl InteractionStore for InMemoryStore {
    async fn viewed_course_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self.history_ids(user_id, |h| &h.viewed_course_ids))
    }

    async fn bookmarked_article_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self.history_ids(user_id, |h| &h.bookmarked_article_ids))
    }

    async fn read_later_article_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self.history_ids(user_id, |h| &h.read_later_article_ids))
    }
}

#[async_trait]
impl ContentResolver for InMemoryStore {
    async fn resolve(
        &self,
        content_id: Uuid,
        content_type: ContentType,
    ) -> Result<Option<serde_json::Value>> {
        Ok(self
            .documents
            .get(&ContentKey::new(content_id, content_type))
            .map(|d| d.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Language, UserPreferences};
    use crate::services::candidates::OverFetch;
    use chrono::Utc;

    fn metadata(content_type: ContentType, popularity: f64) -> ContentMetadata {
        ContentMetadata {
            content_id: Uuid::new_v4(),
            content_type,
            difficulty: None,
            language: Language::Fa,
            techniques: Vec::new(),
            keywords: Vec::new(),
            tags: Vec::new(),
            quality_score: 0.0,
            popularity_score: popularity,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_candidates_applies_filter_sort_and_limit() {
        let store = InMemoryStore::new();
        for popularity in [1.0, 5.0, 3.0, 4.0] {
            store.upsert_metadata(metadata(ContentType::Article, popularity));
        }
        store.upsert_metadata(metadata(ContentType::Course, 100.0));

        let query = CandidateQuery::personalized(
            &UserPreferences::default(),
            crate::models::ContentTypeFilter::Article,
            1,
            OverFetch::personalized(),
        );
        let found = store.find_candidates(&query).await.unwrap();

        let popularity: Vec<f64> = found.iter().map(|m| m.popularity_score).collect();
        assert_eq!(popularity, vec![5.0, 4.0, 3.0]);
    }

    #[tokio::test]
    async fn test_get_or_create_preferences_persists_default() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();

        assert!(store.get_preferences(user_id).await.unwrap().is_none());
        let created = store.get_or_create_preferences(user_id).await.unwrap();
        assert_eq!(created, UserPreferences::default());
        assert!(store.get_preferences(user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_user_has_empty_history() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();

        assert!(store.viewed_course_ids(user_id).await.unwrap().is_empty());
        assert!(store.bookmarked_article_ids(user_id).await.unwrap().is_empty());
        assert!(store.read_later_article_ids(user_id).await.unwrap().is_empty());
    }
}
