/// HTTP handlers for the `/api/v1` surface
///
/// Handlers decode requests, validate identifiers and pagination, invoke the
/// index or the recommendation engine, and shape JSend responses. The core
/// never sees HTTP types.
pub mod recommendations;
pub mod reviews;

use actix_web::{web, HttpResponse};

use crate::models::FailEnvelope;

pub use recommendations::{recommend_by_content, recommend_by_user, PaginationQuery};
pub use reviews::{create_reviews, delete_review, list_reviews};

/// Registers every `/api/v1` route. Shared between `main` and the
/// integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_reviews)
        .service(list_reviews)
        .service(delete_review)
        .service(recommend_by_content)
        .service(recommend_by_user);
}

/// JSON extractor configuration: malformed bodies become a JSend fail with
/// `body` as the field key instead of actix's default error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response =
            HttpResponse::BadRequest().json(FailEnvelope::field("body", "Invalid request body format"));
        actix_web::error::InternalError::from_response(err, response).into()
    })
}
