//! Heuristic artist similarity with a per-library cache.
//!
//! A score is the weighted sum of three overlaps (shared genres, shared
//! folders, related names). Results are ordered by score, then by the
//! artist's ingestion rank, so they never depend on hash iteration order.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use crate::config::SimilarityWeights;
use crate::library::{ArtistProfile, LibraryIndex};

/// Artists at or below this score are never reported as similar.
pub const MIN_SCORE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct WeightsKey([u64; 3]);

impl From<SimilarityWeights> for WeightsKey {
    fn from(w: SimilarityWeights) -> Self {
        Self([
            w.genre.to_bits(),
            w.folder.to_bits(),
            w.artist_name.to_bits(),
        ])
    }
}

type CacheKey = (String, usize, WeightsKey);

#[derive(Debug, Default)]
pub struct SimilarityModel {
    weights: SimilarityWeights,
    cache: HashMap<CacheKey, Vec<String>>,
}

impl SimilarityModel {
    pub fn new(weights: SimilarityWeights) -> Self {
        Self {
            weights,
            cache: HashMap::new(),
        }
    }

    pub fn weights(&self) -> SimilarityWeights {
        self.weights
    }

    /// Change the weights. Cached results are dropped when anything changed.
    pub fn set_weights(&mut self, weights: SimilarityWeights) {
        if weights != self.weights {
            self.weights = weights;
            self.clear_cache();
        }
    }

    /// Must be called whenever the library the cache was filled from changes.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Up to `limit` artists most similar to `seed`, best first. Unknown
    /// seeds have no similar artists.
    pub fn similar_artists(
        &mut self,
        index: &LibraryIndex,
        seed: &str,
        limit: usize,
    ) -> Vec<String> {
        let key = (seed.to_string(), limit, WeightsKey::from(self.weights));
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let Some(seed_profile) = index.artist(seed) else {
            return Vec::new();
        };

        let mut scored: Vec<(f64, usize, &str)> = index
            .artists()
            .filter(|other| other.name != seed)
            .map(|other| (self.score(seed_profile, other), other.rank, other.name.as_str()))
            .filter(|(score, _, _)| *score > MIN_SCORE)
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        let result: Vec<String> = scored
            .into_iter()
            .take(limit)
            .map(|(_, _, name)| name.to_string())
            .collect();

        trace!(seed, limit, similar = ?result, "computed similar artists");
        self.cache.insert(key, result.clone());
        result
    }

    /// Weighted similarity of two profiles. Not normalized to 1.
    pub fn score(&self, a: &ArtistProfile, b: &ArtistProfile) -> f64 {
        let w = self.weights;
        let mut score = 0.0;
        if w.genre > 0.0 {
            score += w.genre * overlap(&a.genres, &b.genres);
        }
        if w.folder > 0.0 {
            score += w.folder * overlap(&a.folders, &b.folders);
        }
        if w.artist_name > 0.0 {
            score += w.artist_name * name_match(&a.name, &b.name);
        }
        score
    }
}

/// `|a ∩ b| / max(1, |a|, |b|)`
fn overlap<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let common = a.intersection(b).count();
    common as f64 / a.len().max(b.len()).max(1) as f64
}

/// 0.8 for a shared first word longer than two characters, otherwise half
/// the share of common words longer than three characters.
pub fn name_match(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();

    let (Some(first_a), Some(first_b)) = (words_a.first(), words_b.first()) else {
        return 0.0;
    };
    if first_a == first_b && first_a.chars().count() > 2 {
        return 0.8;
    }

    let common = words_a
        .iter()
        .filter(|w| w.chars().count() > 3 && words_b.contains(w))
        .count();
    if common == 0 {
        return 0.0;
    }
    0.5 * common as f64 / words_a.len().max(words_b.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::fixtures::{index_of, record};

    fn library() -> LibraryIndex {
        index_of(vec![
            record("/music/rock/a1.mp3", "A", &["Rock", "Indie"]),
            record("/music/rock/b1.mp3", "B", &["Rock", "Indie"]),
            record("/music/misc/c1.mp3", "C", &["Rock"]),
            record("/music/misc/d1.mp3", "D", &["Rock"]),
            record("/music/jazz/e1.mp3", "E", &["Jazz"]),
            record("/music/misc/f1.mp3", "The Black Keys", &["Blues"]),
            record("/music/misc/g1.mp3", "The Black Crowes", &["Blues"]),
        ])
    }

    #[test]
    fn name_match_rules() {
        assert_eq!(name_match("The Black Keys", "the black crowes"), 0.8);
        // First word too short: fall back to shared long words.
        assert_eq!(
            name_match("DJ Shadow Band", "MC Shadow Crew"),
            0.5 * 1.0 / 3.0
        );
        assert_eq!(name_match("Air", "Air Supply"), 0.8);
        assert_eq!(name_match("Abba", "Queen"), 0.0);
        assert_eq!(name_match("", "Queen"), 0.0);
    }

    #[test]
    fn similar_artists_orders_by_score_then_rank() {
        let index = library();
        let mut model = SimilarityModel::new(SimilarityWeights::default());

        // B shares every genre and the folder with A: 0.5 + 0.3.
        // C and D share one of two genres: 0.25 each, ordered by rank.
        let similar = model.similar_artists(&index, "A", 5);
        assert_eq!(similar, vec!["B", "C", "D"]);
    }

    #[test]
    fn weak_matches_are_dropped_and_limit_applies() {
        let index = library();
        let mut model = SimilarityModel::new(SimilarityWeights::default());
        let similar = model.similar_artists(&index, "A", 2);
        assert_eq!(similar, vec!["B", "C"]);
        let wide = model.similar_artists(&index, "A", 10);
        assert!(!wide.contains(&"E".to_string()));
    }

    #[test]
    fn similar_artists_is_deterministic_and_cache_coherent() {
        let index = library();
        let mut model = SimilarityModel::new(SimilarityWeights::default());
        let first = model.similar_artists(&index, "A", 5);
        assert_eq!(model.cached_entries(), 1);
        let second = model.similar_artists(&index, "A", 5);
        assert_eq!(first, second);

        model.clear_cache();
        assert_eq!(model.cached_entries(), 0);
        assert_eq!(model.similar_artists(&index, "A", 5), first);
    }

    #[test]
    fn reweighting_invalidates_cache() {
        let index = library();
        let mut model = SimilarityModel::new(SimilarityWeights::default());
        model.similar_artists(&index, "The Black Keys", 5);
        assert_eq!(model.cached_entries(), 1);

        model.set_weights(SimilarityWeights::default());
        assert_eq!(model.cached_entries(), 1);

        model.set_weights(SimilarityWeights {
            genre: 0.0,
            folder: 0.0,
            artist_name: 1.0,
        });
        assert_eq!(model.cached_entries(), 0);
        assert_eq!(
            model.similar_artists(&index, "The Black Keys", 5),
            vec!["The Black Crowes"]
        );
    }

    #[test]
    fn unknown_seed_has_no_similar_artists() {
        let index = library();
        let mut model = SimilarityModel::new(SimilarityWeights::default());
        assert!(model.similar_artists(&index, "Nobody", 5).is_empty());
    }
}
