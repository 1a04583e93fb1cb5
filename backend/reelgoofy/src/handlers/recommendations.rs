/// Recommendation endpoints
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{RecommendationData, SuccessEnvelope};
use crate::services::RecommendationService;

/// Default page size when the `limit` query parameter is omitted.
const DEFAULT_LIMIT: usize = 20;

/// Raw `limit` / `offset` query parameters. Parsed by hand so malformed or
/// negative values fail with the offending parameter's name as the key.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PaginationQuery {
    fn parse(&self) -> Result<(Option<usize>, usize)> {
        let limit = match &self.limit {
            None => Some(DEFAULT_LIMIT),
            Some(raw) => Some(parse_non_negative("limit", raw)?),
        };
        let offset = match &self.offset {
            None => 0,
            Some(raw) => parse_non_negative("offset", raw)?,
        };
        Ok((limit, offset))
    }
}

fn parse_non_negative(field: &str, raw: &str) -> Result<usize> {
    raw.parse::<i64>()
        .ok()
        .filter(|value| *value >= 0)
        .map(|value| value as usize)
        .ok_or_else(|| AppError::validation(field, "must be a non-negative integer"))
}

/// GET /api/v1/recommendations/content/{contentId}/content
#[get("/api/v1/recommendations/content/{contentId}/content")]
pub async fn recommend_by_content(
    service: web::Data<RecommendationService>,
    path: web::Path<String>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse> {
    let content_id = Uuid::parse_str(&path.into_inner())
        .map_err(|_| AppError::validation("contentId", "invalid UUID format"))?;
    let (limit, offset) = query.parse()?;
    debug!(%content_id, ?limit, offset, "content-to-content recommendation");

    let recommendations = service.recommend_by_content(content_id, limit, offset)?;
    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(RecommendationData { recommendations })))
}

/// GET /api/v1/recommendations/users/{userId}/content
#[get("/api/v1/recommendations/users/{userId}/content")]
pub async fn recommend_by_user(
    service: web::Data<RecommendationService>,
    path: web::Path<String>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse> {
    let user_id = Uuid::parse_str(&path.into_inner())
        .map_err(|_| AppError::validation("userId", "invalid UUID format"))?;
    let (limit, offset) = query.parse()?;
    debug!(%user_id, ?limit, offset, "content-to-user recommendation");

    let recommendations = service.recommend_by_user(user_id, limit, offset)?;
    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(RecommendationData { recommendations })))
}
