/// Recommendation API Handlers
///
/// HTTP endpoints for related content and personalized recommendations
use actix_web::{get, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::RecommendationConfig;
use crate::error::{AppError, Result};
use crate::metrics::metrics_handler;
use crate::models::{ContentType, ContentTypeFilter, HydratedCandidate};
use crate::services::RecommendationEngine;

/// Header carrying the caller's user id, set by the upstream gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// Query parameters for GET /api/v1/recommendations/related
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedQuery {
    pub content_id: Uuid,
    pub content_type: ContentType,
    pub limit: Option<usize>,
}

/// Query parameters for GET /api/v1/recommendations/personalized
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedQuery {
    #[serde(default)]
    pub content_type: ContentTypeFilter,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItem {
    pub content_id: Uuid,
    pub content_type: ContentType,
    pub similarity_score: f64,
    pub content: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedItem {
    pub content_id: Uuid,
    pub content_type: ContentType,
    pub score: f64,
    pub content: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse<T> {
    pub items: Vec<T>,
    pub count: usize,
}

impl<T> RecommendationResponse<T> {
    fn new(items: Vec<T>) -> Self {
        let count = items.len();
        Self { items, count }
    }
}

impl From<HydratedCandidate> for RelatedItem {
    fn from(c: HydratedCandidate) -> Self {
        Self {
            content_id: c.key.content_id,
            content_type: c.key.content_type,
            similarity_score: c.score,
            content: c.content,
        }
    }
}

impl From<HydratedCandidate> for PersonalizedItem {
    fn from(c: HydratedCandidate) -> Self {
        Self {
            content_id: c.key.content_id,
            content_type: c.key.content_type,
            score: c.score,
            content: c.content,
        }
    }
}

/// Handler state for recommendation endpoints
pub struct RecommendationHandlerState {
    pub engine: Arc<RecommendationEngine>,
    pub config: RecommendationConfig,
}

impl RecommendationHandlerState {
    fn clamp_limit(&self, requested: Option<usize>, default: usize) -> usize {
        requested
            .unwrap_or(default)
            .clamp(1, self.config.max_limit.max(1))
    }
}

/// GET /api/v1/recommendations/related
/// Content similar to the given item
#[get("/api/v1/recommendations/related")]
pub async fn get_related(
    query: web::Query<RelatedQuery>,
    state: web::Data<RecommendationHandlerState>,
) -> Result<HttpResponse> {
    let limit = state.clamp_limit(query.limit, state.config.default_related_limit);

    debug!(
        "Getting related content for {} {}, limit: {}",
        query.content_type, query.content_id, limit
    );

    let ranked = state
        .engine
        .related(query.content_id, query.content_type, limit)
        .await
        .map_err(|err| {
            error!("Failed to get related content: {:?}", err);
            err
        })?;

    let hydrated = state.engine.hydrate(ranked).await?;
    let items: Vec<RelatedItem> = hydrated.into_iter().map(RelatedItem::from).collect();

    Ok(HttpResponse::Ok().json(RecommendationResponse::new(items)))
}

/// GET /api/v1/recommendations/personalized
/// Recommendations for the calling user
#[get("/api/v1/recommendations/personalized")]
pub async fn get_personalized(
    req: HttpRequest,
    query: web::Query<PersonalizedQuery>,
    state: web::Data<RecommendationHandlerState>,
) -> Result<HttpResponse> {
    let user_id = user_id_from(&req)?;
    let limit = state.clamp_limit(query.limit, state.config.default_personalized_limit);

    debug!(
        "Getting personalized recommendations for user: {}, type: {}, limit: {}",
        user_id, query.content_type, limit
    );

    let ranked = state
        .engine
        .personalized(user_id, query.content_type, limit)
        .await
        .map_err(|err| {
            error!("Failed to get personalized recommendations: {:?}", err);
            err
        })?;

    let hydrated = state.engine.hydrate(ranked).await?;
    let items: Vec<PersonalizedItem> = hydrated.into_iter().map(PersonalizedItem::from).collect();

    Ok(HttpResponse::Ok().json(RecommendationResponse::new(items)))
}

fn user_id_from(req: &HttpRequest) -> Result<Uuid> {
    let raw = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", USER_ID_HEADER)))?;

    raw.to_str()
        .ok()
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {} header", USER_ID_HEADER)))
}

/// Register every route of this service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(|| async { "OK" }))
        .route("/metrics", web::get().to(metrics_handler))
        .service(get_related)
        .service(get_personalized);
}
