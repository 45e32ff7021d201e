//! In-memory library index: tracks, artist profiles and derived lookups.
//!
//! Built once per scan: `ingest` every record, then `finalize` once. The
//! genre index, folder cache and recently-added order are derived state and
//! are rebuilt from scratch on every `finalize`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::IngestError;

use super::model::{Track, TrackRecord, folder_name};

pub const PSEUDO_GENRE_PREFIX: &str = "folder:";

/// Everything the library knows about one artist name.
#[derive(Debug, Clone)]
pub struct ArtistProfile {
    pub name: String,
    /// Position in ingestion order, used to break ties deterministically.
    pub rank: usize,
    pub tracks: Vec<Arc<Track>>,
    pub genres: BTreeSet<String>,
    /// `genres` in the order they were first seen.
    pub genre_order: Vec<String>,
    pub years: BTreeSet<i32>,
    pub folders: BTreeSet<PathBuf>,
}

impl ArtistProfile {
    fn new(name: String, rank: usize) -> Self {
        Self {
            name,
            rank,
            tracks: Vec::new(),
            genres: BTreeSet::new(),
            genre_order: Vec::new(),
            years: BTreeSet::new(),
            folders: BTreeSet::new(),
        }
    }

    fn add_genre(&mut self, genre: &str) {
        if self.genres.insert(genre.to_string()) {
            self.genre_order.push(genre.to_string());
        }
    }

    /// The first genre this artist was tagged with.
    pub fn main_genre(&self) -> Option<&str> {
        self.genre_order.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryStats {
    pub tracks: usize,
    pub artists: usize,
    pub genres: usize,
    pub folders: usize,
}

#[derive(Debug, Default)]
pub struct LibraryIndex {
    tracks: Vec<Arc<Track>>,
    by_path: HashMap<PathBuf, usize>,
    profiles: HashMap<String, ArtistProfile>,
    artist_order: Vec<String>,
    genres: BTreeMap<String, BTreeSet<String>>,
    folders: BTreeMap<PathBuf, BTreeSet<String>>,
    recently_added: Vec<Arc<Track>>,
}

impl LibraryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest every record and finalize. Rejected records are returned
    /// alongside the index instead of aborting the build.
    pub fn build(records: impl IntoIterator<Item = TrackRecord>) -> (Self, Vec<IngestError>) {
        let mut index = Self::new();
        let mut rejected = Vec::new();
        for record in records {
            if let Err(e) = index.ingest(record) {
                warn!("skipping track: {e}");
                rejected.push(e);
            }
        }
        index.finalize();
        (index, rejected)
    }

    /// Add one track and fold it into its artist's profile.
    ///
    /// Only an empty path is an error. A path that is already indexed is
    /// ignored.
    pub fn ingest(&mut self, record: TrackRecord) -> Result<(), IngestError> {
        if record.path.as_os_str().is_empty() {
            return Err(IngestError::MissingPath);
        }
        if self.by_path.contains_key(&record.path) {
            warn!("duplicate track path ignored: {}", record.path.display());
            return Ok(());
        }

        let track = Arc::new(Track::from_record(record));

        let next_rank = self.artist_order.len();
        let profile = self.profiles.entry(track.artist.clone()).or_insert_with(|| {
            self.artist_order.push(track.artist.clone());
            ArtistProfile::new(track.artist.clone(), next_rank)
        });
        profile.tracks.push(Arc::clone(&track));
        for genre in &track.genres {
            profile.add_genre(genre);
        }
        if let Some(year) = track.year {
            profile.years.insert(year);
        }
        profile.folders.insert(track.folder.clone());

        self.by_path.insert(track.path.clone(), self.tracks.len());
        self.recently_added.push(Arc::clone(&track));
        self.tracks.push(track);
        Ok(())
    }

    /// Derive the genre index, pseudo-genres, folder cache and
    /// recently-added order. Call once after the last `ingest`.
    pub fn finalize(&mut self) {
        self.genres.clear();
        self.folders.clear();

        for name in &self.artist_order {
            let Some(profile) = self.profiles.get_mut(name) else {
                continue;
            };
            if profile.genres.is_empty() && !profile.tracks.is_empty() {
                let pseudo: Vec<String> = profile
                    .folders
                    .iter()
                    .map(|folder| format!("{PSEUDO_GENRE_PREFIX}{}", folder_name(folder)))
                    .collect();
                for genre in &pseudo {
                    profile.add_genre(genre);
                }
                debug!(artist = %name, genres = ?profile.genres, "assigned folder pseudo-genres");
            }
            for genre in &profile.genres {
                self.genres
                    .entry(genre.clone())
                    .or_default()
                    .insert(name.clone());
            }
        }

        for track in &self.tracks {
            self.folders
                .entry(track.folder.clone())
                .or_default()
                .insert(track.artist.clone());
        }

        // Stable: equal mtimes keep ingestion order.
        self.recently_added
            .sort_by(|a, b| b.modified_time.cmp(&a.modified_time));
    }

    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    pub fn track(&self, path: &Path) -> Option<&Arc<Track>> {
        self.by_path.get(path).map(|&i| &self.tracks[i])
    }

    pub fn artist(&self, name: &str) -> Option<&ArtistProfile> {
        self.profiles.get(name)
    }

    /// Profiles in ingestion order.
    pub fn artists(&self) -> impl Iterator<Item = &ArtistProfile> {
        self.artist_order
            .iter()
            .filter_map(|name| self.profiles.get(name))
    }

    /// Artist names in ingestion order.
    pub fn artist_order(&self) -> &[String] {
        &self.artist_order
    }

    /// Genre (real or pseudo) to the artists tagged with it.
    pub fn genres(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.genres
    }

    /// Folder path to the artists with at least one track directly inside it.
    pub fn folders(&self) -> &BTreeMap<PathBuf, BTreeSet<String>> {
        &self.folders
    }

    /// Tracks, most recently modified first.
    pub fn recently_added(&self) -> &[Arc<Track>] {
        &self.recently_added
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn stats(&self) -> LibraryStats {
        LibraryStats {
            tracks: self.tracks.len(),
            artists: self.artist_order.len(),
            genres: self.genres.len(),
            folders: self.folders.len(),
        }
    }
}
