//! Read-side collaborators of the recommendation engine
//!
//! Postgres implementations back production; `InMemoryStore` backs tests
//! and local development.

pub mod content_repo;
pub mod interactions_repo;
pub mod memory;
pub mod metadata_repo;
pub mod preferences_repo;

use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ContentMetadata, ContentType, UserPreferences};
use crate::services::candidates::CandidateQuery;

pub use content_repo::PgContentResolver;
pub use interactions_repo::PgInteractionStore;
pub use memory::InMemoryStore;
pub use metadata_repo::PgMetadataStore;
pub use preferences_repo::PgPreferenceStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn find_metadata(
        &self,
        content_id: Uuid,
        content_type: ContentType,
    ) -> Result<Option<ContentMetadata>>;

    /// Apply the query's filter and sort hint, returning at most `fetch_limit` records
    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<ContentMetadata>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_preferences(&self, user_id: Uuid) -> Result<Option<UserPreferences>>;

    /// Return stored preferences, creating the default record on first access
    async fn get_or_create_preferences(&self, user_id: Uuid) -> Result<UserPreferences>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionStore: Send + Sync {
    async fn viewed_course_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;
    async fn bookmarked_article_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;
    async fn read_later_article_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;
}

/// Resolves a ranked key into its full content document
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentResolver: Send + Sync {
    async fn resolve(
        &self,
        content_id: Uuid,
        content_type: ContentType,
    ) -> Result<Option<serde_json::Value>>;
}
