/// Review entities and the ingest request DTO
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Incoming review payload, not yet persisted.
///
/// Identifiers are decoded as UUIDs by serde; everything else is validated
/// by [`validate_raw_review`] before the batch touches the index.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawReview {
    pub content_id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub actors: Option<Vec<String>>,
    #[serde(default)]
    pub origins: Option<Vec<String>>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub released: Option<String>,
    #[validate(length(min = 1, message = "must be a non-empty string"))]
    pub review: String,
    #[validate(range(min = 0, max = 100, message = "must be an integer between 0 and 100"))]
    pub score: i64,
}

/// A persisted review: a [`RawReview`] plus its server-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub content_id: Uuid,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origins: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    pub review: String,
    pub score: i64,
}

impl Review {
    /// Attaches a server-assigned id to a validated raw review.
    pub fn from_raw(id: Uuid, raw: RawReview) -> Self {
        Self {
            id,
            content_id: raw.content_id,
            user_id: raw.user_id,
            title: raw.title,
            genres: raw.genres,
            tags: raw.tags,
            description: raw.description,
            director: raw.director,
            actors: raw.actors,
            origins: raw.origins,
            duration: raw.duration,
            released: raw.released,
            review: raw.review,
            score: raw.score,
        }
    }
}

/// Body of `POST /api/v1/reviews`: `{"data":{"reviews":[…]}}`.
#[derive(Debug, Deserialize)]
pub struct ReviewsRequest {
    pub data: ReviewBatch,
}

#[derive(Debug, Deserialize)]
pub struct ReviewBatch {
    #[serde(default)]
    pub reviews: Vec<RawReview>,
}

/// Validates a raw review, flattening failures into a `field → message` map
/// suitable for a JSend fail body. Pure; shared by handlers and tests.
pub fn validate_raw_review(raw: &RawReview) -> Result<(), BTreeMap<String, String>> {
    let mut failures = BTreeMap::new();
    if let Err(errors) = raw.validate() {
        for (field, field_errors) in errors.field_errors() {
            if let Some(error) = field_errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid value".to_string());
                failures.insert(field.to_string(), message);
            }
        }
    }

    for (field, values) in [
        ("genres", &raw.genres),
        ("tags", &raw.tags),
        ("actors", &raw.actors),
        ("origins", &raw.origins),
    ] {
        if let Some(values) = values {
            if values.iter().any(|value| value.trim().is_empty()) {
                failures.insert(
                    field.to_string(),
                    "entries must be non-empty strings".to_string(),
                );
            }
        }
    }

    if let Some(released) = &raw.released {
        if NaiveDate::parse_from_str(released, "%Y-%m-%d").is_err() {
            failures.insert(
                "released".to_string(),
                "must be a date in YYYY-MM-DD format".to_string(),
            );
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(score: i64) -> RawReview {
        RawReview {
            content_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: Some("Alien".to_string()),
            genres: Some(vec!["sci-fi".to_string()]),
            tags: None,
            description: None,
            director: None,
            actors: None,
            origins: None,
            duration: None,
            released: None,
            review: "great".to_string(),
            score,
        }
    }

    #[test]
    fn valid_review_passes() {
        assert!(validate_raw_review(&raw(85)).is_ok());
    }

    #[test]
    fn score_out_of_range_names_the_field() {
        let failures = validate_raw_review(&raw(150)).unwrap_err();
        assert!(failures.contains_key("score"));
    }

    #[test]
    fn empty_review_text_names_the_field() {
        let mut review = raw(50);
        review.review = String::new();
        let failures = validate_raw_review(&review).unwrap_err();
        assert!(failures.contains_key("review"));
    }

    #[test]
    fn malformed_release_date_names_the_field() {
        let mut review = raw(50);
        review.released = Some("not-a-date".to_string());
        let failures = validate_raw_review(&review).unwrap_err();
        assert!(failures.contains_key("released"));

        review.released = Some("1979-05-25".to_string());
        assert!(validate_raw_review(&review).is_ok());
    }

    #[test]
    fn empty_genre_entry_is_rejected() {
        let mut review = raw(50);
        review.genres = Some(vec!["sci-fi".to_string(), "  ".to_string()]);
        let failures = validate_raw_review(&review).unwrap_err();
        assert!(failures.contains_key("genres"));
    }
}
