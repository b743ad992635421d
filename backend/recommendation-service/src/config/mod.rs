use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::services::candidates::{PERSONALIZED_OVERFETCH_FACTOR, RELATED_OVERFETCH_FACTOR};
use crate::services::hydration::DEFAULT_HYDRATION_CONCURRENCY;
use crate::services::weights::ScoringWeights;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
    pub service_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub related_overfetch_factor: usize,
    pub personalized_overfetch_factor: usize,
    pub default_related_limit: usize,
    pub default_personalized_limit: usize,
    /// Upper bound for any requested `limit`
    pub max_limit: usize,
    pub hydration_concurrency: usize,
    pub weights: ScoringWeights,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            related_overfetch_factor: RELATED_OVERFETCH_FACTOR,
            personalized_overfetch_factor: PERSONALIZED_OVERFETCH_FACTOR,
            default_related_limit: 6,
            default_personalized_limit: 10,
            max_limit: 50,
            hydration_concurrency: DEFAULT_HYDRATION_CONCURRENCY,
            weights: ScoringWeights::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RecommendationConfig::default();

        let mut weights = ScoringWeights::default();
        weights.preference.favorite_categories_bonus = parse_or(
            &lookup,
            "FAVORITE_CATEGORIES_BONUS",
            weights.preference.favorite_categories_bonus,
        )?;

        let recommendation = RecommendationConfig {
            related_overfetch_factor: parse_positive(
                &lookup,
                "RELATED_OVERFETCH_FACTOR",
                defaults.related_overfetch_factor,
            )?,
            personalized_overfetch_factor: parse_positive(
                &lookup,
                "PERSONALIZED_OVERFETCH_FACTOR",
                defaults.personalized_overfetch_factor,
            )?,
            default_related_limit: parse_positive(
                &lookup,
                "DEFAULT_RELATED_LIMIT",
                defaults.default_related_limit,
            )?,
            default_personalized_limit: parse_positive(
                &lookup,
                "DEFAULT_PERSONALIZED_LIMIT",
                defaults.default_personalized_limit,
            )?,
            max_limit: parse_positive(&lookup, "RECOMMENDATION_MAX_LIMIT", defaults.max_limit)?,
            hydration_concurrency: parse_positive(
                &lookup,
                "HYDRATION_CONCURRENCY",
                defaults.hydration_concurrency,
            )?,
            weights,
        };

        Ok(Config {
            app: AppConfig {
                env: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
                port: parse_or(&lookup, "APP_PORT", 8012)?,
                service_name: lookup("SERVICE_NAME")
                    .unwrap_or_else(|| "recommendation-service".to_string()),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
            recommendation,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(_) => Err(ConfigError::Invalid { key, value }),
        },
        None => Ok(default),
    }
}

fn parse_positive<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
        });
    }
    Ok(value)
}
