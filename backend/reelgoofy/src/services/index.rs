/// In-memory review index with derived content profiles
///
/// Authoritative store for reviews plus the secondary indices
/// (content id → review ids, user id → review ids) and the per-content
/// profile cache. All state lives behind a single reader-writer lock so
/// every mutation, including the profile recomputation it triggers, becomes
/// visible atomically, and every read observes a consistent snapshot.
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{ContentProfile, RawReview, Review};

/// A review plus its insertion sequence number. The sequence gives a stable
/// per-call ordering for lookups and the first-seen tie-break when electing
/// a profile's representative title and director.
#[derive(Debug, Clone)]
struct StoredReview {
    seq: u64,
    review: Review,
}

#[derive(Debug, Default)]
struct IndexState {
    reviews: HashMap<Uuid, StoredReview>,
    by_content: HashMap<Uuid, HashSet<Uuid>>,
    by_user: HashMap<Uuid, HashSet<Uuid>>,
    profiles: HashMap<Uuid, ContentProfile>,
    next_seq: u64,
}

#[derive(Debug, Default)]
pub struct ReviewIndex {
    state: RwLock<IndexState>,
}

impl ReviewIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, IndexState>> {
        self.state
            .read()
            .map_err(|_| AppError::Internal("review index lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, IndexState>> {
        self.state
            .write()
            .map_err(|_| AppError::Internal("review index lock poisoned".to_string()))
    }

    /// Persists a pre-validated batch, assigning fresh review ids.
    ///
    /// The whole batch lands under one write guard: concurrent readers see
    /// either none of it or all of it, profiles included.
    pub fn insert_batch(&self, raws: Vec<RawReview>) -> Result<Vec<Review>> {
        let mut state = self.write()?;
        let mut created = Vec::with_capacity(raws.len());
        let mut touched = HashSet::new();
        for raw in raws {
            let review = Review::from_raw(Uuid::new_v4(), raw);
            let seq = state.next_seq;
            state.next_seq += 1;
            state
                .by_content
                .entry(review.content_id)
                .or_default()
                .insert(review.id);
            state
                .by_user
                .entry(review.user_id)
                .or_default()
                .insert(review.id);
            touched.insert(review.content_id);
            state.reviews.insert(
                review.id,
                StoredReview {
                    seq,
                    review: review.clone(),
                },
            );
            created.push(review);
        }
        for content_id in touched {
            state.recompute_profile(content_id);
        }
        Ok(created)
    }

    /// Removes a review and unwinds both secondary indices. Secondary keys
    /// whose set becomes empty are dropped, as is the content's profile when
    /// its last review goes.
    pub fn delete(&self, review_id: Uuid) -> Result<()> {
        let mut state = self.write()?;
        let stored = state
            .reviews
            .remove(&review_id)
            .ok_or_else(|| AppError::not_found("reviewId", "review not found"))?;
        let content_id = stored.review.content_id;
        let user_id = stored.review.user_id;
        if let Some(ids) = state.by_content.get_mut(&content_id) {
            ids.remove(&review_id);
            if ids.is_empty() {
                state.by_content.remove(&content_id);
            }
        }
        if let Some(ids) = state.by_user.get_mut(&user_id) {
            ids.remove(&review_id);
            if ids.is_empty() {
                state.by_user.remove(&user_id);
            }
        }
        state.recompute_profile(content_id);
        Ok(())
    }

    pub fn get(&self, review_id: Uuid) -> Result<Review> {
        let state = self.read()?;
        state
            .reviews
            .get(&review_id)
            .map(|stored| stored.review.clone())
            .ok_or_else(|| AppError::not_found("reviewId", "review not found"))
    }

    /// All reviews for a content, in insertion order. Empty when unknown.
    pub fn get_by_content(&self, content_id: Uuid) -> Result<Vec<Review>> {
        let state = self.read()?;
        Ok(state.reviews_for(state.by_content.get(&content_id)))
    }

    /// All reviews by a user, in insertion order. Empty when unknown.
    pub fn get_by_user(&self, user_id: Uuid) -> Result<Vec<Review>> {
        let state = self.read()?;
        Ok(state.reviews_for(state.by_user.get(&user_id)))
    }

    pub fn has_content(&self, content_id: Uuid) -> Result<bool> {
        Ok(self.read()?.by_content.contains_key(&content_id))
    }

    pub fn has_user(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.read()?.by_user.contains_key(&user_id))
    }

    /// Every stored review, in insertion order.
    pub fn all_reviews(&self) -> Result<Vec<Review>> {
        let state = self.read()?;
        let mut stored: Vec<&StoredReview> = state.reviews.values().collect();
        stored.sort_by_key(|s| s.seq);
        Ok(stored.into_iter().map(|s| s.review.clone()).collect())
    }

    pub fn profile(&self, content_id: Uuid) -> Result<Option<ContentProfile>> {
        Ok(self.read()?.profiles.get(&content_id).cloned())
    }

    /// Snapshot of every content profile.
    pub fn all_profiles(&self) -> Result<Vec<ContentProfile>> {
        Ok(self.read()?.profiles.values().cloned().collect())
    }

    /// Every content profile plus the given user's reviews, taken under a
    /// single read guard so the recommendation scoring pass works over one
    /// consistent snapshot.
    pub fn profiles_and_user_reviews(
        &self,
        user_id: Uuid,
    ) -> Result<(Vec<ContentProfile>, Vec<Review>)> {
        let state = self.read()?;
        let profiles = state.profiles.values().cloned().collect();
        let reviews = state.reviews_for(state.by_user.get(&user_id));
        Ok((profiles, reviews))
    }
}

impl IndexState {
    fn reviews_for(&self, ids: Option<&HashSet<Uuid>>) -> Vec<Review> {
        let mut stored: Vec<&StoredReview> = ids
            .into_iter()
            .flatten()
            .filter_map(|id| self.reviews.get(id))
            .collect();
        stored.sort_by_key(|s| s.seq);
        stored.into_iter().map(|s| s.review.clone()).collect()
    }

    /// Re-derives the profile for one content from its current review set.
    /// Runs inside the write guard of whichever mutation touched the content.
    fn recompute_profile(&mut self, content_id: Uuid) {
        let reviews = self.reviews_for(self.by_content.get(&content_id));
        if reviews.is_empty() {
            self.profiles.remove(&content_id);
            return;
        }
        let title = representative(reviews.iter().map(|r| r.title.as_deref()));
        let director = representative(reviews.iter().map(|r| r.director.as_deref()));
        let genres = union(reviews.iter().map(|r| &r.genres));
        let tags = union(reviews.iter().map(|r| &r.tags));
        let actors = union(reviews.iter().map(|r| &r.actors));
        let mean_score =
            reviews.iter().map(|r| r.score as f64).sum::<f64>() / reviews.len() as f64;
        self.profiles.insert(
            content_id,
            ContentProfile {
                content_id,
                title,
                director,
                genres,
                tags,
                actors,
                mean_score,
                review_count: reviews.len(),
            },
        );
    }
}

/// Most frequent non-empty value, ties broken by first occurrence. The input
/// must already be in insertion order. Empty string when no review carries
/// the field.
fn representative<'a>(values: impl Iterator<Item = Option<&'a str>>) -> String {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, value) in values.flatten().enumerate() {
        if value.is_empty() {
            continue;
        }
        let entry = counts.entry(value).or_insert((0, position));
        entry.0 += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(value, _)| value.to_string())
        .unwrap_or_default()
}

/// De-duplicated union, preserving first-seen order.
fn union<'a>(lists: impl Iterator<Item = &'a Option<Vec<String>>>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for value in lists.flatten().flatten() {
        if seen.insert(value.as_str()) {
            result.push(value.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_review(content_id: Uuid, user_id: Uuid, score: i64) -> RawReview {
        RawReview {
            content_id,
            user_id,
            title: None,
            genres: None,
            tags: None,
            description: None,
            director: None,
            actors: None,
            origins: None,
            duration: None,
            released: None,
            review: "fine".to_string(),
            score,
        }
    }

    #[test]
    fn insert_assigns_unique_ids_and_indexes_by_content_and_user() {
        let index = ReviewIndex::new();
        let content = Uuid::new_v4();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let created = index
            .insert_batch(vec![
                raw_review(content, user_a, 80),
                raw_review(content, user_b, 60),
            ])
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_ne!(created[0].id, created[1].id);

        assert_eq!(index.get_by_content(content).unwrap().len(), 2);
        assert_eq!(index.get_by_user(user_a).unwrap().len(), 1);
        assert!(index.has_content(content).unwrap());
        assert!(index.has_user(user_b).unwrap());
        assert!(!index.has_content(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn get_returns_stored_review_or_not_found() {
        let index = ReviewIndex::new();
        let created = index
            .insert_batch(vec![raw_review(Uuid::new_v4(), Uuid::new_v4(), 42)])
            .unwrap();
        assert_eq!(index.get(created[0].id).unwrap().score, 42);
        assert!(matches!(
            index.get(Uuid::new_v4()),
            Err(AppError::NotFound { field: "reviewId", .. })
        ));
    }

    #[test]
    fn profile_tracks_review_count_and_mean_score() {
        let index = ReviewIndex::new();
        let content = Uuid::new_v4();
        index
            .insert_batch(vec![
                raw_review(content, Uuid::new_v4(), 80),
                raw_review(content, Uuid::new_v4(), 60),
            ])
            .unwrap();
        let profile = index.profile(content).unwrap().unwrap();
        assert_eq!(profile.review_count, 2);
        assert!((profile.mean_score - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn profile_elects_most_frequent_title_with_first_seen_tie_break() {
        let index = ReviewIndex::new();
        let content = Uuid::new_v4();
        let mut first = raw_review(content, Uuid::new_v4(), 50);
        first.title = Some("Alien".to_string());
        let mut second = raw_review(content, Uuid::new_v4(), 50);
        second.title = Some("Aliens".to_string());
        index.insert_batch(vec![first, second]).unwrap();
        // one vote each: the earlier review wins
        assert_eq!(index.profile(content).unwrap().unwrap().title, "Alien");

        let mut third = raw_review(content, Uuid::new_v4(), 50);
        third.title = Some("Aliens".to_string());
        index.insert_batch(vec![third]).unwrap();
        assert_eq!(index.profile(content).unwrap().unwrap().title, "Aliens");
    }

    #[test]
    fn profile_unions_categorical_features_without_duplicates() {
        let index = ReviewIndex::new();
        let content = Uuid::new_v4();
        let mut first = raw_review(content, Uuid::new_v4(), 50);
        first.genres = Some(vec!["sci-fi".to_string(), "horror".to_string()]);
        let mut second = raw_review(content, Uuid::new_v4(), 50);
        second.genres = Some(vec!["horror".to_string(), "thriller".to_string()]);
        index.insert_batch(vec![first, second]).unwrap();
        let profile = index.profile(content).unwrap().unwrap();
        assert_eq!(profile.genres, vec!["sci-fi", "horror", "thriller"]);
    }

    #[test]
    fn profile_skips_empty_titles() {
        let index = ReviewIndex::new();
        let content = Uuid::new_v4();
        let mut first = raw_review(content, Uuid::new_v4(), 50);
        first.title = Some(String::new());
        let mut second = raw_review(content, Uuid::new_v4(), 50);
        second.title = Some("Solaris".to_string());
        index.insert_batch(vec![first, second]).unwrap();
        assert_eq!(index.profile(content).unwrap().unwrap().title, "Solaris");
    }

    #[test]
    fn delete_removes_review_and_updates_profile() {
        let index = ReviewIndex::new();
        let content = Uuid::new_v4();
        let created = index
            .insert_batch(vec![
                raw_review(content, Uuid::new_v4(), 100),
                raw_review(content, Uuid::new_v4(), 50),
            ])
            .unwrap();
        index.delete(created[0].id).unwrap();
        let profile = index.profile(content).unwrap().unwrap();
        assert_eq!(profile.review_count, 1);
        assert!((profile.mean_score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn deleting_last_review_drops_profile_and_index_keys() {
        let index = ReviewIndex::new();
        let content = Uuid::new_v4();
        let user = Uuid::new_v4();
        let created = index
            .insert_batch(vec![raw_review(content, user, 90)])
            .unwrap();
        index.delete(created[0].id).unwrap();
        assert!(index.profile(content).unwrap().is_none());
        assert!(!index.has_content(content).unwrap());
        assert!(!index.has_user(user).unwrap());
        assert!(index.all_reviews().unwrap().is_empty());
    }

    #[test]
    fn delete_of_absent_id_is_not_found() {
        let index = ReviewIndex::new();
        assert!(matches!(
            index.delete(Uuid::new_v4()),
            Err(AppError::NotFound { field: "reviewId", .. })
        ));
    }

    #[test]
    fn second_delete_of_same_id_is_not_found() {
        let index = ReviewIndex::new();
        let created = index
            .insert_batch(vec![raw_review(Uuid::new_v4(), Uuid::new_v4(), 70)])
            .unwrap();
        index.delete(created[0].id).unwrap();
        assert!(index.delete(created[0].id).is_err());
    }

    #[test]
    fn review_count_matches_index_after_arbitrary_mutations() {
        let index = ReviewIndex::new();
        let contents: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let mut ids = Vec::new();
        for round in 0..4 {
            for &content in &contents {
                let created = index
                    .insert_batch(vec![raw_review(content, Uuid::new_v4(), (round * 20) as i64)])
                    .unwrap();
                ids.push(created[0].id);
            }
        }
        for id in ids.iter().step_by(3) {
            index.delete(*id).unwrap();
        }
        for &content in &contents {
            let reviews = index.get_by_content(content).unwrap();
            match index.profile(content).unwrap() {
                Some(profile) => {
                    assert_eq!(profile.review_count, reviews.len());
                    let mean = reviews.iter().map(|r| r.score as f64).sum::<f64>()
                        / reviews.len() as f64;
                    assert!((profile.mean_score - mean).abs() < 1e-9);
                }
                None => assert!(reviews.is_empty()),
            }
        }
    }

    #[test]
    fn batch_is_visible_atomically_in_profiles() {
        let index = ReviewIndex::new();
        let content_a = Uuid::new_v4();
        let content_b = Uuid::new_v4();
        index
            .insert_batch(vec![
                raw_review(content_a, Uuid::new_v4(), 90),
                raw_review(content_b, Uuid::new_v4(), 40),
            ])
            .unwrap();
        let profiles = index.all_profiles().unwrap();
        assert_eq!(profiles.len(), 2);
    }
}
