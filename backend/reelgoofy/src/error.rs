use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::{ErrorEnvelope, FailEnvelope};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// One or more input fields are malformed; keys name the offending
    /// fields. Covers pagination parameters as well.
    #[error("validation failed: {0:?}")]
    Validation(BTreeMap<String, String>),

    /// An id the operation requires is absent from the index.
    #[error("{field} not found: {message}")]
    NotFound {
        field: &'static str,
        message: String,
    },

    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-field validation failure.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(field.to_string(), message.into());
        AppError::Validation(data)
    }

    pub fn not_found(field: &'static str, message: impl Into<String>) -> Self {
        AppError::NotFound {
            field,
            message: message.into(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(data) => {
                HttpResponse::BadRequest().json(FailEnvelope::new(data.clone()))
            }
            AppError::NotFound { field, message } => {
                HttpResponse::NotFound().json(FailEnvelope::field(field, message.clone()))
            }
            AppError::Internal(message) => {
                tracing::error!("internal error: {message}");
                HttpResponse::InternalServerError().json(ErrorEnvelope::new(
                    "Internal server error",
                    StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                ))
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
