/// Shared data model: review entities, derived content profiles and the
/// JSend response envelopes.
mod profile;
mod response;
mod review;

pub use profile::{ContentProfile, Recommendation};
pub use response::{
    ErrorEnvelope, FailEnvelope, RecommendationData, ReviewData, Status, SuccessEnvelope,
};
pub use review::{validate_raw_review, RawReview, Review, ReviewBatch, ReviewsRequest};
