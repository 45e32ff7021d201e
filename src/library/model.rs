use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
/// Display name for a track path without a parent directory.
pub const UNKNOWN_FOLDER: &str = "Unknown";

/// Raw metadata for one audio file, as handed over by the scanner (or any
/// other collaborator). Every field except `path` may be missing.
#[derive(Debug, Clone, Default)]
pub struct TrackRecord {
    pub path: PathBuf,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genres: Vec<String>,
    pub year: Option<i32>,
    pub bpm: Option<u32>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    /// Seconds.
    pub duration: Option<f64>,
    pub rating: Option<f32>,
    pub modified_time: Option<DateTime<Utc>>,
    pub created_time: Option<DateTime<Utc>>,
}

impl TrackRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// A library entry. Identity is `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_artist: String,
    /// Ordered, without duplicates.
    pub genres: Vec<String>,
    pub year: Option<i32>,
    pub bpm: Option<u32>,
    /// Parent directory of `path`.
    pub folder: PathBuf,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    /// Seconds, 0 when unknown.
    pub duration: f64,
    pub rating: f32,
    pub modified_time: DateTime<Utc>,
    pub created_time: Option<DateTime<Utc>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Track {
    /// Fill in the documented defaults for whatever the record lacks.
    ///
    /// The caller guarantees `record.path` is not empty.
    pub(crate) fn from_record(record: TrackRecord) -> Self {
        let path = record.path;
        let title = non_empty(record.title).unwrap_or_else(|| file_stem(&path));
        let artist = non_empty(record.artist);
        let album_artist = non_empty(record.album_artist)
            .or_else(|| artist.clone())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let artist = artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let album = non_empty(record.album).unwrap_or_else(|| UNKNOWN_ALBUM.to_string());

        let mut genres: Vec<String> = Vec::new();
        for genre in record.genres {
            let genre = genre.trim();
            if !genre.is_empty() && !genres.iter().any(|g| g == genre) {
                genres.push(genre.to_string());
            }
        }

        let folder = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Self {
            title,
            artist,
            album,
            album_artist,
            genres,
            year: record.year.filter(|y| *y > 0),
            bpm: record.bpm,
            folder,
            track_number: record.track_number,
            disc_number: record.disc_number,
            duration: record
                .duration
                .filter(|d| d.is_finite() && *d > 0.0)
                .unwrap_or(0.0),
            rating: record.rating.unwrap_or(0.0),
            modified_time: record.modified_time.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            created_time: record.created_time,
            path,
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}

/// Last component of a folder path, used for pseudo-genres and playlist names.
pub fn folder_name(folder: &Path) -> String {
    if let Some(name) = folder.file_name() {
        return name.to_string_lossy().into_owned();
    }
    let full = folder.to_string_lossy();
    if full.is_empty() {
        UNKNOWN_FOLDER.to_string()
    } else {
        full.into_owned()
    }
}
