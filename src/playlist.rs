//! The `Playlist` entity.
//!
//! A playlist never holds the same path twice, and its `artists` set always
//! equals the artists of its current tracks. Both are enforced here, so
//! fields are private and every mutation goes through a method.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::library::Track;

/// Tag for playlists built by the template rule engine.
pub const TEMPLATE_TAG: &str = "template";
/// Tag for playlists read back from a save document without one.
pub const IMPORTED_TAG: &str = "imported";

#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    name: String,
    description: String,
    tracks: Vec<Arc<Track>>,
    artists: BTreeSet<String>,
    generated_by: String,
}

impl Playlist {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        tracks: Vec<Arc<Track>>,
        generated_by: impl Into<String>,
    ) -> Self {
        let mut playlist = Self {
            name: name.into(),
            description: description.into(),
            tracks: Vec::new(),
            artists: BTreeSet::new(),
            generated_by: generated_by.into(),
        };
        playlist.set_tracks(tracks);
        playlist
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    pub fn artists(&self) -> &BTreeSet<String> {
        &self.artists
    }

    pub fn generated_by(&self) -> &str {
        &self.generated_by
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Replace the track list. Later duplicates of a path are dropped and the
    /// artist set is recomputed.
    pub fn set_tracks(&mut self, tracks: Vec<Arc<Track>>) {
        let mut seen = HashSet::with_capacity(tracks.len());
        self.tracks = tracks
            .into_iter()
            .filter(|t| seen.insert(t.path.clone()))
            .collect();
        self.artists = self.tracks.iter().map(|t| t.artist.clone()).collect();
    }

    pub fn contains_path(&self, path: &std::path::Path) -> bool {
        self.tracks.iter().any(|t| t.path == path)
    }

    /// Total duration of known track lengths, in seconds.
    pub fn duration(&self) -> f64 {
        self.tracks.iter().map(|t| t.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::fixtures::{index_of, record};

    fn tracks() -> Vec<Arc<Track>> {
        index_of(vec![
            record("/m/1.mp3", "A", &[]),
            record("/m/2.mp3", "B", &[]),
            record("/m/3.mp3", "A", &[]),
        ])
        .tracks()
        .to_vec()
    }

    #[test]
    fn new_dedups_paths_and_collects_artists() {
        let mut t = tracks();
        t.push(Arc::clone(&t[0]));
        let p = Playlist::new("Mix", "desc", t, "genres");
        assert_eq!(p.len(), 3);
        assert_eq!(
            p.artists().iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["A", "B"]
        );
    }

    #[test]
    fn set_tracks_recomputes_artists() {
        let t = tracks();
        let mut p = Playlist::new("Mix", "", t.clone(), "genres");
        p.set_tracks(vec![Arc::clone(&t[1])]);
        assert_eq!(p.len(), 1);
        assert_eq!(p.artists().len(), 1);
        assert!(p.artists().contains("B"));
        assert!(p.contains_path(std::path::Path::new("/m/2.mp3")));
        assert!(!p.contains_path(std::path::Path::new("/m/1.mp3")));
    }

    #[test]
    fn rename_and_describe_leave_tracks_alone() {
        let mut p = Playlist::new("Mix", "", tracks(), "genres");
        p.rename("Sunday");
        p.set_description("slow songs");
        assert_eq!(p.name(), "Sunday");
        assert_eq!(p.description(), "slow songs");
        assert_eq!(p.len(), 3);
        assert_eq!(p.duration(), 600.0);
    }
}
