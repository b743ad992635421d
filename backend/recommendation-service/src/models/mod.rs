use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when a string does not name a known enum variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Kind of content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Course,
    Artwork,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Course => "course",
            Self::Artwork => "artwork",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "article" => Ok(Self::Article),
            "course" => Ok(Self::Course),
            "artwork" => Ok(Self::Artwork),
            _ => Err(ParseEnumError::new("content type", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(ParseEnumError::new("difficulty", s)),
        }
    }
}

/// Content language. `Both` marks bilingual content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Fa,
    En,
    Both,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fa => "fa",
            Self::En => "en",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fa" => Ok(Self::Fa),
            "en" => Ok(Self::En),
            "both" => Ok(Self::Both),
            _ => Err(ParseEnumError::new("language", s)),
        }
    }
}

/// Difficulty a user wants to see; `All` disables the difficulty filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyPreference {
    All,
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// The concrete difficulty to filter on, if any
    pub fn as_difficulty(&self) -> Option<Difficulty> {
        match self {
            Self::All => None,
            Self::Beginner => Some(Difficulty::Beginner),
            Self::Intermediate => Some(Difficulty::Intermediate),
            Self::Advanced => Some(Difficulty::Advanced),
        }
    }
}

impl std::fmt::Display for DifficultyPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DifficultyPreference {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            other => other
                .parse::<Difficulty>()
                .map(|d| match d {
                    Difficulty::Beginner => Self::Beginner,
                    Difficulty::Intermediate => Self::Intermediate,
                    Difficulty::Advanced => Self::Advanced,
                })
                .map_err(|_| ParseEnumError::new("difficulty level", s)),
        }
    }
}

/// Content type filter for personalized recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTypeFilter {
    Article,
    Course,
    Artwork,
    #[default]
    All,
}

impl ContentTypeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Course => "course",
            Self::Artwork => "artwork",
            Self::All => "all",
        }
    }

    pub fn as_content_type(&self) -> Option<ContentType> {
        match self {
            Self::Article => Some(ContentType::Article),
            Self::Course => Some(ContentType::Course),
            Self::Artwork => Some(ContentType::Artwork),
            Self::All => None,
        }
    }
}

impl std::fmt::Display for ContentTypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentTypeFilter {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            other => other
                .parse::<ContentType>()
                .map(|t| match t {
                    ContentType::Article => Self::Article,
                    ContentType::Course => Self::Course,
                    ContentType::Artwork => Self::Artwork,
                })
                .map_err(|_| ParseEnumError::new("content type filter", s)),
        }
    }
}

/// Identity of a content item. Metadata is unique per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentKey {
    pub content_id: Uuid,
    pub content_type: ContentType,
}

impl ContentKey {
    pub fn new(content_id: Uuid, content_type: ContentType) -> Self {
        Self {
            content_id,
            content_type,
        }
    }
}

/// Classification record for a content item, read by the scorers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    pub content_id: Uuid,
    pub content_type: ContentType,
    pub difficulty: Option<Difficulty>,
    pub language: Language,
    pub techniques: Vec<String>,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    pub quality_score: f64,
    pub popularity_score: f64,
    pub created_at: DateTime<Utc>,
}

impl ContentMetadata {
    pub fn key(&self) -> ContentKey {
        ContentKey::new(self.content_id, self.content_type)
    }
}

/// Stored preferences of a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub favorite_categories: Vec<String>,
    pub favorite_techniques: Vec<String>,
    pub preferred_language: Language,
    pub difficulty_level: DifficultyPreference,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            favorite_categories: Vec::new(),
            favorite_techniques: Vec::new(),
            preferred_language: Language::Fa,
            difficulty_level: DifficultyPreference::All,
        }
    }
}

/// Content the user already engaged with. Only ever used as a penalty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionHistory {
    pub viewed_course_ids: HashSet<Uuid>,
    pub bookmarked_article_ids: HashSet<Uuid>,
    pub read_later_article_ids: HashSet<Uuid>,
}

/// Metadata annotated with the score it was ranked by
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub metadata: ContentMetadata,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn new(metadata: ContentMetadata, score: f64) -> Self {
        Self { metadata, score }
    }
}

/// Full content body resolved for a ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedCandidate {
    pub key: ContentKey,
    pub score: f64,
    pub content: serde_json::Value,
}
