use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::ContentResolver;
use crate::error::{AppError, Result};
use crate::models::ContentType;

/// Loads full content rows as JSON for the hydration stage
pub struct PgContentResolver {
    pool: PgPool,
}

impl PgContentResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn table_for(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Article => "articles",
        ContentType::Course => "courses",
        ContentType::Artwork => "artworks",
    }
}

#[async_trait]
impl ContentResolver for PgContentResolver {
    async fn resolve(
        &self,
        content_id: Uuid,
        content_type: ContentType,
    ) -> Result<Option<serde_json::Value>> {
        let sql = format!(
            "SELECT row_to_json(t) FROM {} t WHERE t.id = $1",
            table_for(content_type)
        );

        sqlx::query_scalar::<_, serde_json::Value>(&sql)
            .bind(content_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    content_id = %content_id,
                    content_type = %content_type,
                    "Failed to resolve content: {}", e
                );
                AppError::Database(e.to_string())
            })
    }
}
