/// JSend response envelopes
///
/// Every body leaving the service is one of three shapes keyed by `status`:
/// `success` (payload under `data`), `fail` (client error, `data` maps field
/// names to messages) or `error` (server fault with `message` and `code`).
use std::collections::BTreeMap;

use serde::Serialize;

use super::profile::Recommendation;
use super::review::Review;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
    Error,
}

#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T: Serialize> {
    pub status: Status,
    pub data: Option<T>,
}

impl<T: Serialize> SuccessEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
        }
    }
}

impl SuccessEnvelope<()> {
    /// Plain acknowledgement: `{"status":"success","data":null}`.
    pub fn empty() -> Self {
        Self {
            status: Status::Success,
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FailEnvelope {
    pub status: Status,
    pub data: BTreeMap<String, String>,
}

impl FailEnvelope {
    pub fn new(data: BTreeMap<String, String>) -> Self {
        Self {
            status: Status::Fail,
            data,
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(field.to_string(), message.into());
        Self::new(data)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: Status,
    pub message: String,
    pub code: u16,
    pub data: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            code,
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewData {
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationData {
    pub recommendations: Vec<Recommendation>,
}
