use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::error;
use uuid::Uuid;

use super::InteractionStore;
use crate::error::{AppError, Result};

/// Interaction history: course progress, bookmarks and the read-later queue
pub struct PgInteractionStore {
    pool: PgPool,
}

impl PgInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_ids(&self, sql: &str, user_id: Uuid, what: &str) -> Result<HashSet<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to fetch {}: {}", what, e);
                AppError::Database(e.to_string())
            })?;

        Ok(ids.into_iter().collect())
    }
}

#[async_trait]
impl InteractionStore for PgInteractionStore {
    async fn viewed_course_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        self.fetch_ids(
            "SELECT course_id FROM course_progress WHERE user_id = $1",
            user_id,
            "viewed courses",
        )
        .await
    }

    async fn bookmarked_article_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        self.fetch_ids(
            "SELECT article_id FROM article_bookmarks WHERE user_id = $1",
            user_id,
            "bookmarked articles",
        )
        .await
    }

    async fn read_later_article_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        self.fetch_ids(
            "SELECT article_id FROM read_later WHERE user_id = $1",
            user_id,
            "read-later articles",
        )
        .await
    }
}
