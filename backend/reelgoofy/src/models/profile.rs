/// Derived per-content aggregates and the recommendation result entity
use serde::Serialize;
use uuid::Uuid;

/// Aggregate view of one content, derived from the reviews that mention it.
///
/// `title` and `director` are the most frequent non-empty values across the
/// content's reviews (ties go to the earliest review by insertion order);
/// the categorical fields are de-duplicated unions. Re-derived by the index
/// whenever the content's review set changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentProfile {
    pub content_id: Uuid,
    pub title: String,
    pub director: String,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub actors: Vec<String>,
    pub mean_score: f64,
    pub review_count: usize,
}

/// One ranked recommendation. Ephemeral; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub title: String,
}
