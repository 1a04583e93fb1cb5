/// Review ingest, listing and deletion endpoints
use std::sync::Arc;

use actix_web::{delete, get, post, web, HttpResponse};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{validate_raw_review, ReviewData, ReviewsRequest, SuccessEnvelope};
use crate::services::ReviewIndex;

/// POST /api/v1/reviews
///
/// Ingests a batch atomically: every review is validated before any is
/// persisted, and the first failure rejects the whole batch.
#[post("/api/v1/reviews")]
pub async fn create_reviews(
    index: web::Data<Arc<ReviewIndex>>,
    body: web::Json<ReviewsRequest>,
) -> Result<HttpResponse> {
    let raw_reviews = body.into_inner().data.reviews;
    for raw in &raw_reviews {
        if let Err(failures) = validate_raw_review(raw) {
            return Err(AppError::Validation(failures));
        }
    }

    let reviews = index.insert_batch(raw_reviews)?;
    info!(count = reviews.len(), "ingested review batch");
    Ok(HttpResponse::Created().json(SuccessEnvelope::new(ReviewData { reviews })))
}

/// GET /api/v1/reviews
#[get("/api/v1/reviews")]
pub async fn list_reviews(index: web::Data<Arc<ReviewIndex>>) -> Result<HttpResponse> {
    let reviews = index.all_reviews()?;
    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(ReviewData { reviews })))
}

/// DELETE /api/v1/reviews/{reviewId}
#[delete("/api/v1/reviews/{reviewId}")]
pub async fn delete_review(
    index: web::Data<Arc<ReviewIndex>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let review_id = Uuid::parse_str(&path.into_inner())
        .map_err(|_| AppError::validation("reviewId", "invalid UUID format"))?;
    index.delete(review_id)?;
    info!(%review_id, "deleted review");
    Ok(HttpResponse::Ok().json(SuccessEnvelope::empty()))
}
