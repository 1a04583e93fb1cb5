/// Recommendation engine
///
/// Stateless scorer over the review index and its profile cache. Builds a
/// preference profile (the source content's profile, or a weighted aggregate
/// of a user's positively-reviewed contents), scores every candidate content
/// by weighted categorical overlap, ranks, then paginates.
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{ContentProfile, Recommendation};
use crate::services::ReviewIndex;

/// Scoring weights and thresholds.
///
/// A genre match counts three times an actor match, a tag twice, a shared
/// director one and a half times. Reviews scoring at or above
/// `positive_threshold` count as positive signal for a user; contents with a
/// mean score at or above `quality_threshold` back the cold-start fallback.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub genre: f64,
    pub tag: f64,
    pub director: f64,
    pub actor: f64,
    pub positive_threshold: i64,
    pub quality_threshold: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            genre: 3.0,
            tag: 2.0,
            director: 1.5,
            actor: 1.0,
            positive_threshold: 70,
            quality_threshold: 80.0,
        }
    }
}

/// Accumulated feature weights describing what the requester likes.
///
/// For content-to-content every feature of the source profile carries weight
/// one, which reduces scoring to plain intersection counts. For
/// content-to-user each positively-reviewed content contributes its features
/// weighted by the review's score.
#[derive(Debug, Default)]
struct PreferenceProfile {
    genres: HashMap<String, f64>,
    tags: HashMap<String, f64>,
    actors: HashMap<String, f64>,
    directors: HashMap<String, f64>,
}

impl PreferenceProfile {
    fn add_profile(&mut self, profile: &ContentProfile, weight: f64) {
        for genre in &profile.genres {
            *self.genres.entry(genre.clone()).or_default() += weight;
        }
        for tag in &profile.tags {
            *self.tags.entry(tag.clone()).or_default() += weight;
        }
        for actor in &profile.actors {
            *self.actors.entry(actor.clone()).or_default() += weight;
        }
        if !profile.director.is_empty() {
            *self.directors.entry(profile.director.clone()).or_default() += weight;
        }
    }

    fn score(&self, candidate: &ContentProfile, weights: &ScoringWeights) -> f64 {
        let mut score = 0.0;
        for genre in &candidate.genres {
            if let Some(weight) = self.genres.get(genre) {
                score += weights.genre * weight;
            }
        }
        for tag in &candidate.tags {
            if let Some(weight) = self.tags.get(tag) {
                score += weights.tag * weight;
            }
        }
        for actor in &candidate.actors {
            if let Some(weight) = self.actors.get(actor) {
                score += weights.actor * weight;
            }
        }
        if !candidate.director.is_empty() {
            if let Some(weight) = self.directors.get(&candidate.director) {
                score += weights.director * weight;
            }
        }
        score
    }
}

pub struct RecommendationService {
    index: Arc<ReviewIndex>,
    weights: ScoringWeights,
}

impl RecommendationService {
    pub fn new(index: Arc<ReviewIndex>) -> Self {
        Self::with_weights(index, ScoringWeights::default())
    }

    pub fn with_weights(index: Arc<ReviewIndex>, weights: ScoringWeights) -> Self {
        Self { index, weights }
    }

    /// Contents similar to the given one, ranked. `NotFound` when the
    /// content has no reviews. The source never appears in the result.
    pub fn recommend_by_content(
        &self,
        content_id: Uuid,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Recommendation>> {
        let profiles = self.index.all_profiles()?;
        let source = profiles
            .iter()
            .find(|p| p.content_id == content_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("contentId", "content with given ID not found"))?;

        let mut preference = PreferenceProfile::default();
        preference.add_profile(&source, 1.0);
        let excluded = HashSet::from([content_id]);
        Ok(self.rank(&preference, &profiles, &excluded, limit, offset))
    }

    /// Contents likely to interest the given user, ranked. `NotFound` when
    /// the user has no reviews. Contents the user already reviewed never
    /// appear. A user without positive reviews falls back to the top-rated
    /// profiles by mean score.
    pub fn recommend_by_user(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Recommendation>> {
        let (profiles, user_reviews) = self.index.profiles_and_user_reviews(user_id)?;
        if user_reviews.is_empty() {
            return Err(AppError::not_found("userId", "user has no reviews"));
        }

        let excluded: HashSet<Uuid> = user_reviews.iter().map(|r| r.content_id).collect();
        let by_id: HashMap<Uuid, &ContentProfile> =
            profiles.iter().map(|p| (p.content_id, p)).collect();

        let mut preference = PreferenceProfile::default();
        let mut has_positive = false;
        for review in &user_reviews {
            if review.score < self.weights.positive_threshold {
                continue;
            }
            has_positive = true;
            if let Some(profile) = by_id.get(&review.content_id) {
                preference.add_profile(profile, review.score as f64);
            }
        }

        // The fallback is reserved for users without any positive review; a
        // positive review of a featureless content keeps the (empty)
        // preference profile, which matches no candidate.
        if !has_positive {
            return Ok(self.quality_fallback(&profiles, &excluded, limit, offset));
        }
        Ok(self.rank(&preference, &profiles, &excluded, limit, offset))
    }

    fn rank(
        &self,
        preference: &PreferenceProfile,
        profiles: &[ContentProfile],
        excluded: &HashSet<Uuid>,
        limit: Option<usize>,
        offset: usize,
    ) -> Vec<Recommendation> {
        let mut scored: Vec<(f64, &ContentProfile)> = profiles
            .iter()
            .filter(|p| !excluded.contains(&p.content_id))
            .filter_map(|p| {
                let score = preference.score(p, &self.weights);
                (score > 0.0).then_some((score, p))
            })
            .collect();
        scored.sort_by(|a, b| rank_order(a.0, a.1, b.0, b.1));
        paginate(scored.into_iter().map(|(_, p)| p), limit, offset)
    }

    /// Cold-start ranking: quality contents by descending mean score.
    fn quality_fallback(
        &self,
        profiles: &[ContentProfile],
        excluded: &HashSet<Uuid>,
        limit: Option<usize>,
        offset: usize,
    ) -> Vec<Recommendation> {
        let mut candidates: Vec<&ContentProfile> = profiles
            .iter()
            .filter(|p| !excluded.contains(&p.content_id))
            .filter(|p| p.mean_score >= self.weights.quality_threshold)
            .collect();
        candidates.sort_by(|a, b| rank_order(a.mean_score, a, b.mean_score, b));
        paginate(candidates.into_iter(), limit, offset)
    }
}

/// Descending score, ties broken by ascending content id so results are
/// stable across runs. Uuid byte order matches the lexicographic order of
/// its hyphenated string form.
fn rank_order(
    score_a: f64,
    profile_a: &ContentProfile,
    score_b: f64,
    profile_b: &ContentProfile,
) -> Ordering {
    score_b
        .total_cmp(&score_a)
        .then_with(|| profile_a.content_id.cmp(&profile_b.content_id))
}

/// `result[offset : offset+limit]` with clamping; `None` limit means no cap.
fn paginate<'a>(
    ranked: impl Iterator<Item = &'a ContentProfile>,
    limit: Option<usize>,
    offset: usize,
) -> Vec<Recommendation> {
    ranked
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .map(|p| Recommendation {
            id: p.content_id,
            title: p.title.clone(),
        })
        .collect()
}
