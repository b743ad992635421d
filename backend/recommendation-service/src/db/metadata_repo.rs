/// Content Metadata Repository
///
/// Candidate queries against the `content_metadata` table
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, warn};
use uuid::Uuid;

use super::MetadataStore;
use crate::error::{AppError, Result};
use crate::models::{ContentMetadata, ContentType, Difficulty, Language};
use crate::services::candidates::{CandidateFilter, CandidateQuery, SortHint};

#[derive(Debug, sqlx::FromRow)]
struct MetadataRow {
    content_id: Uuid,
    content_type: String,
    difficulty: Option<String>,
    language: String,
    techniques: Vec<String>,
    keywords: Vec<String>,
    tags: Vec<String>,
    quality_score: f64,
    popularity_score: f64,
    created_at: DateTime<Utc>,
}

impl MetadataRow {
    fn has_finite_scores(&self) -> bool {
        self.quality_score.is_finite() && self.popularity_score.is_finite()
    }
}

impl TryFrom<MetadataRow> for ContentMetadata {
    type Error = AppError;

    fn try_from(row: MetadataRow) -> Result<Self> {
        let invalid = |e: crate::models::ParseEnumError| {
            AppError::Database(format!("invalid metadata row {}: {}", row.content_id, e))
        };

        if !row.has_finite_scores() {
            return Err(AppError::Database(format!(
                "invalid metadata row {}: non-finite score",
                row.content_id
            )));
        }

        Ok(ContentMetadata {
            content_id: row.content_id,
            content_type: row.content_type.parse::<ContentType>().map_err(invalid)?,
            difficulty: row
                .difficulty
                .as_deref()
                .map(str::parse::<Difficulty>)
                .transpose()
                .map_err(invalid)?,
            language: row.language.parse::<Language>().map_err(invalid)?,
            techniques: row.techniques,
            keywords: row.keywords,
            tags: row.tags,
            quality_score: row.quality_score,
            popularity_score: row.popularity_score,
            created_at: row.created_at,
        })
    }
}

const METADATA_COLUMNS: &str = r#"
    content_id,
    content_type,
    difficulty,
    language,
    techniques,
    keywords,
    tags,
    quality_score,
    popularity_score,
    created_at
"#;

pub struct PgMetadataStore {
    pool: PgPool,
}

impl PgMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rows with a non-finite score are skipped so they cannot poison ranking
    fn decode(rows: Vec<MetadataRow>) -> Result<Vec<ContentMetadata>> {
        rows.into_iter()
            .filter(|row| {
                let finite = row.has_finite_scores();
                if !finite {
                    warn!(
                        content_id = %row.content_id,
                        content_type = %row.content_type,
                        "Skipping candidate with non-finite score"
                    );
                }
                finite
            })
            .map(ContentMetadata::try_from)
            .collect()
    }
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn find_metadata(
        &self,
        content_id: Uuid,
        content_type: ContentType,
    ) -> Result<Option<ContentMetadata>> {
        let sql = format!(
            "SELECT {} FROM content_metadata WHERE content_id = $1 AND content_type = $2",
            METADATA_COLUMNS
        );

        let row = sqlx::query_as::<_, MetadataRow>(&sql)
            .bind(content_id)
            .bind(content_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to fetch content metadata: {}", e);
                AppError::Database(e.to_string())
            })?;

        row.map(ContentMetadata::try_from).transpose()
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<ContentMetadata>> {
        let fetch_limit = i64::try_from(query.fetch_limit).unwrap_or(i64::MAX);

        let rows = match &query.filter {
            CandidateFilter::Related {
                exclude,
                techniques,
                difficulty,
                keywords,
                tags,
            } => {
                let match_all = techniques.is_empty()
                    && difficulty.is_none()
                    && keywords.is_empty()
                    && tags.is_empty();

                let sql = format!(
                    r#"
                    SELECT {}
                    FROM content_metadata
                    WHERE NOT (content_id = $1 AND content_type = $2)
                        AND (
                            $3::BOOLEAN
                            OR techniques && $4::TEXT[]
                            OR ($5::TEXT IS NOT NULL AND difficulty = $5)
                            OR keywords && $6::TEXT[]
                            OR tags && $7::TEXT[]
                        )
                    {}
                    LIMIT $8
                    "#,
                    METADATA_COLUMNS,
                    order_clause(query.sort)
                );

                sqlx::query_as::<_, MetadataRow>(&sql)
                    .bind(exclude.content_id)
                    .bind(exclude.content_type.as_str())
                    .bind(match_all)
                    .bind(techniques)
                    .bind(difficulty.map(|d| d.as_str()))
                    .bind(keywords)
                    .bind(tags)
                    .bind(fetch_limit)
                    .fetch_all(&self.pool)
                    .await
            }
            CandidateFilter::Personalized {
                content_type,
                difficulty,
                languages,
            } => {
                let languages: Option<Vec<String>> = languages
                    .as_ref()
                    .map(|langs| langs.iter().map(|l| l.as_str().to_string()).collect());

                let sql = format!(
                    r#"
                    SELECT {}
                    FROM content_metadata
                    WHERE ($1::TEXT IS NULL OR content_type = $1)
                        AND ($2::TEXT IS NULL OR difficulty = $2)
                        AND ($3::TEXT[] IS NULL OR language = ANY($3))
                    {}
                    LIMIT $4
                    "#,
                    METADATA_COLUMNS,
                    order_clause(query.sort)
                );

                sqlx::query_as::<_, MetadataRow>(&sql)
                    .bind(content_type.map(|t| t.as_str()))
                    .bind(difficulty.map(|d| d.as_str()))
                    .bind(languages)
                    .bind(fetch_limit)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| {
            error!("Failed to fetch candidate metadata: {}", e);
            AppError::Database(e.to_string())
        })?;

        Self::decode(rows)
    }
}

fn order_clause(sort: SortHint) -> &'static str {
    match sort {
        SortHint::Unordered => "",
        SortHint::PopularityThenQuality => "ORDER BY popularity_score DESC, quality_score DESC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> MetadataRow {
        MetadataRow {
            content_id: Uuid::new_v4(),
            content_type: "course".to_string(),
            difficulty: Some("advanced".to_string()),
            language: "both".to_string(),
            techniques: vec!["charcoal".to_string()],
            keywords: Vec::new(),
            tags: Vec::new(),
            quality_score: 4.5,
            popularity_score: 12.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_decoding() {
        let metadata = ContentMetadata::try_from(row()).unwrap();
        assert_eq!(metadata.content_type, ContentType::Course);
        assert_eq!(metadata.difficulty, Some(Difficulty::Advanced));
        assert_eq!(metadata.language, Language::Both);
    }

    #[test]
    fn test_row_decoding_rejects_unknown_values() {
        let mut bad = row();
        bad.content_type = "podcast".to_string();
        assert!(matches!(
            ContentMetadata::try_from(bad),
            Err(AppError::Database(_))
        ));
    }

    #[test]
    fn test_row_decoding_rejects_non_finite_scores() {
        let mut bad = row();
        bad.quality_score = f64::NAN;
        assert!(matches!(
            ContentMetadata::try_from(bad),
            Err(AppError::Database(_))
        ));

        let mut infinite = row();
        infinite.popularity_score = f64::INFINITY;
        assert!(ContentMetadata::try_from(infinite).is_err());
    }

    #[test]
    fn test_decode_skips_non_finite_rows() {
        let mut nan = row();
        nan.quality_score = f64::NAN;
        let good = row();
        let good_id = good.content_id;

        let decoded = PgMetadataStore::decode(vec![nan, good]).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].content_id, good_id);
    }

    #[test]
    fn test_order_clause() {
        assert_eq!(order_clause(SortHint::Unordered), "");
        assert!(order_clause(SortHint::PopularityThenQuality)
            .starts_with("ORDER BY popularity_score DESC"));
    }
}
