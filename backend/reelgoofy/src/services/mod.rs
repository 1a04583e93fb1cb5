/// Core services: the review index (with its profile cache) and the
/// recommendation engine that runs over it.
pub mod index;
pub mod recommendation;

pub use index::ReviewIndex;
pub use recommendation::{RecommendationService, ScoringWeights};
