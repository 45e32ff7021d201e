//! The save document: full track lists per playlist, so a session can be
//! reopened and edited later.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PersistenceError;
use crate::library::{Track, TrackRecord};
use crate::playlist::{IMPORTED_TAG, Playlist};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTrack {
    pub path: PathBuf,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

fn imported() -> String {
    IMPORTED_TAG.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlaylist {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "imported")]
    pub generated_by: String,
    #[serde(default)]
    pub tracks: Vec<SavedTrack>,
}

impl From<&Track> for SavedTrack {
    fn from(track: &Track) -> Self {
        Self {
            path: track.path.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            year: track.year,
            genres: track.genres.clone(),
            duration: Some(track.duration),
        }
    }
}

impl SavedTrack {
    /// Rebuild a track, applying the usual ingestion defaults. `None` for an
    /// entry without a path.
    fn into_track(self) -> Option<Track> {
        if self.path.as_os_str().is_empty() {
            return None;
        }
        Some(Track::from_record(TrackRecord {
            path: self.path,
            title: Some(self.title),
            artist: Some(self.artist),
            album: Some(self.album),
            genres: self.genres,
            year: self.year,
            duration: self.duration,
            ..TrackRecord::default()
        }))
    }
}

impl From<&Playlist> for SavedPlaylist {
    fn from(playlist: &Playlist) -> Self {
        Self {
            name: playlist.name().to_string(),
            description: playlist.description().to_string(),
            generated_by: playlist.generated_by().to_string(),
            tracks: playlist
                .tracks()
                .iter()
                .map(|t| SavedTrack::from(t.as_ref()))
                .collect(),
        }
    }
}

impl SavedPlaylist {
    pub fn into_playlist(self) -> Playlist {
        let total = self.tracks.len();
        let tracks: Vec<Arc<Track>> = self
            .tracks
            .into_iter()
            .filter_map(SavedTrack::into_track)
            .map(Arc::new)
            .collect();
        let dropped = total - tracks.len();
        if dropped > 0 {
            warn!(playlist = %self.name, dropped, "saved tracks without a path");
        }
        Playlist::new(self.name, self.description, tracks, self.generated_by)
    }
}

pub fn encode_save_document(playlists: &[Playlist]) -> Result<String, serde_json::Error> {
    let saved: Vec<SavedPlaylist> = playlists.iter().map(SavedPlaylist::from).collect();
    serde_json::to_string_pretty(&saved)
}

/// Parse a save document. Artist sets are recomputed from the tracks.
pub fn decode_save_document(text: &str) -> Result<Vec<Playlist>, serde_json::Error> {
    let saved: Vec<SavedPlaylist> = serde_json::from_str(text)?;
    let playlists = saved.into_iter().map(SavedPlaylist::into_playlist);
    Ok(playlists.collect())
}

pub fn save_playlists(path: &Path, playlists: &[Playlist]) -> Result<(), PersistenceError> {
    let text = encode_save_document(playlists).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), playlists = playlists.len(), "saved playlists");
    Ok(())
}

pub fn load_playlists(path: &Path) -> Result<Vec<Playlist>, PersistenceError> {
    let text = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let playlists = decode_save_document(&text).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), playlists = playlists.len(), "loaded playlists");
    Ok(playlists)
}
