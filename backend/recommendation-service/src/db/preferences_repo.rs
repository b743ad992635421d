use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use super::PreferenceStore;
use crate::error::{AppError, Result};
use crate::models::{DifficultyPreference, Language, UserPreferences};

#[derive(Debug, sqlx::FromRow)]
struct PreferencesRow {
    favorite_categories: Vec<String>,
    favorite_techniques: Vec<String>,
    preferred_language: String,
    difficulty_level: String,
}

impl TryFrom<PreferencesRow> for UserPreferences {
    type Error = AppError;

    fn try_from(row: PreferencesRow) -> Result<Self> {
        Ok(UserPreferences {
            favorite_categories: row.favorite_categories,
            favorite_techniques: row.favorite_techniques,
            preferred_language: row
                .preferred_language
                .parse::<Language>()
                .map_err(|e| AppError::Database(e.to_string()))?,
            difficulty_level: row
                .difficulty_level
                .parse::<DifficultyPreference>()
                .map_err(|e| AppError::Database(e.to_string()))?,
        })
    }
}

/// User preferences backed by the `user_preferences` table
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn get_preferences(&self, user_id: Uuid) -> Result<Option<UserPreferences>> {
        let row = sqlx::query_as::<_, PreferencesRow>(
            r#"
            SELECT favorite_categories, favorite_techniques, preferred_language, difficulty_level
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch user preferences: {}", e);
            AppError::Database(e.to_string())
        })?;

        row.map(UserPreferences::try_from).transpose()
    }

    async fn get_or_create_preferences(&self, user_id: Uuid) -> Result<UserPreferences> {
        if let Some(existing) = self.get_preferences(user_id).await? {
            return Ok(existing);
        }

        let defaults = UserPreferences::default();

        // Concurrent first requests race here; the loser's insert is a no-op
        let inserted = sqlx::query(
            r#"
            INSERT INTO user_preferences
                (user_id, favorite_categories, favorite_techniques,
                 preferred_language, difficulty_level)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&defaults.favorite_categories)
        .bind(&defaults.favorite_techniques)
        .bind(defaults.preferred_language.as_str())
        .bind(defaults.difficulty_level.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to create default user preferences: {}", e);
            AppError::Database(e.to_string())
        })?;

        if inserted.rows_affected() == 1 {
            info!(user_id = %user_id, "Created default user preferences");
            return Ok(defaults);
        }

        self.get_preferences(user_id).await?.ok_or_else(|| {
            AppError::Database(format!("preferences for user {} vanished", user_id))
        })
    }
}
