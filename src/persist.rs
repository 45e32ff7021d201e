//! Playlist persistence: M3U export with a JSON summary, and the JSON save
//! document used to reopen a session.

mod document;
mod m3u;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::PersistenceError;
use crate::playlist::Playlist;

pub use document::{
    SavedPlaylist, SavedTrack, decode_save_document, encode_save_document, load_playlists,
    save_playlists,
};
pub use m3u::{format_m3u, playlist_file_name, sanitize_filename};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub name: String,
    pub description: String,
    pub track_count: usize,
    pub artist_count: usize,
    pub generated_by: String,
}

/// The summary document written next to the exported M3U files.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub generated: DateTime<Utc>,
    pub playlists: Vec<PlaylistSummary>,
}

impl ExportSummary {
    pub fn new(playlists: &[Playlist], generated: DateTime<Utc>) -> Self {
        Self {
            generated,
            playlists: playlists
                .iter()
                .map(|p| PlaylistSummary {
                    name: p.name().to_string(),
                    description: p.description().to_string(),
                    track_count: p.len(),
                    artist_count: p.artists().len(),
                    generated_by: p.generated_by().to_string(),
                })
                .collect(),
        }
    }
}

/// What an export managed to write. Files are written independently; a
/// failed file does not stop the others and nothing is rolled back.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<PersistenceError>,
}

fn write_file(path: PathBuf, contents: &str, report: &mut ExportReport) {
    match fs::write(&path, contents) {
        Ok(()) => report.written.push(path),
        Err(source) => {
            warn!(path = %path.display(), error = %source, "could not write file");
            report.failures.push(PersistenceError::Io { path, source });
        }
    }
}

/// Write the summary document and one M3U file per playlist into `dir`.
///
/// Only failing to create `dir` is an error; per-file failures are collected
/// in the report.
pub fn export_playlists(
    dir: &Path,
    playlists: &[Playlist],
    summary_file_name: &str,
) -> Result<ExportReport, PersistenceError> {
    fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    info!(dir = %dir.display(), playlists = playlists.len(), "exporting playlists");

    let mut report = ExportReport::default();

    let summary_path = dir.join(summary_file_name);
    match serde_json::to_string_pretty(&ExportSummary::new(playlists, Utc::now())) {
        Ok(json) => write_file(summary_path, &json, &mut report),
        Err(source) => report.failures.push(PersistenceError::Json {
            path: summary_path,
            source,
        }),
    }

    for playlist in playlists {
        let path = dir.join(playlist_file_name(playlist.name()));
        write_file(path, &format_m3u(playlist), &mut report);
    }

    Ok(report)
}
