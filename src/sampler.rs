//! Diversity-bounded track selection.
//!
//! All randomness in the engine goes through a `Sampler`, so a fixed seed
//! reproduces the same playlists.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::library::{LibraryIndex, Track};

pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Nondeterministic source, seeded from the OS.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Up to `count` tracks drawn uniformly without replacement.
    pub fn select_random(&mut self, tracks: &[Arc<Track>], count: usize) -> Vec<Arc<Track>> {
        let mut picked = tracks.to_vec();
        picked.shuffle(&mut self.rng);
        picked.truncate(count);
        picked
    }

    /// Draw up to `max_per_artist` tracks from each artist, visiting artists
    /// in random order, until `max_total` tracks are collected.
    ///
    /// With a `pool`, only tracks whose path is in the pool are eligible.
    /// Unknown artists and artists with nothing eligible are skipped. The
    /// result holds no duplicate paths and is shuffled again so its order
    /// does not follow the artist visiting order.
    pub fn select_from_artists(
        &mut self,
        index: &LibraryIndex,
        artists: &[String],
        max_per_artist: usize,
        max_total: usize,
        pool: Option<&HashSet<PathBuf>>,
    ) -> Vec<Arc<Track>> {
        let mut order: Vec<&String> = artists.iter().collect();
        order.shuffle(&mut self.rng);

        let mut visited: HashSet<&str> = HashSet::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut result: Vec<Arc<Track>> = Vec::new();

        for artist in order {
            if result.len() >= max_total {
                break;
            }
            if !visited.insert(artist.as_str()) {
                continue;
            }
            let Some(profile) = index.artist(artist) else {
                continue;
            };

            let eligible: Vec<Arc<Track>> = profile
                .tracks
                .iter()
                .filter(|t| pool.is_none_or(|p| p.contains(&t.path)))
                .filter(|t| !seen.contains(&t.path))
                .cloned()
                .collect();
            if eligible.is_empty() {
                continue;
            }

            let take = max_per_artist.min(max_total - result.len());
            for track in self.select_random(&eligible, take) {
                if seen.insert(track.path.clone()) {
                    result.push(track);
                }
            }
        }

        result.shuffle(&mut self.rng);
        result
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}
