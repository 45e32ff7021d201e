use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lofty::prelude::{Accessor, AudioFile, ItemKey, TaggedFileExt};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::IngestError;

use super::model::TrackRecord;

/// Result of walking a music directory.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub records: Vec<TrackRecord>,
    /// Audio files whose metadata could not be read.
    pub skipped: Vec<IngestError>,
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Collect the audio files under `dir` that pass the settings' filters, in
/// walk order.
pub fn audio_files(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("cannot walk entry: {e}");
                None
            }
        })
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_audio_file(path, settings))
        .collect()
}

/// Walk `dir` and read one `TrackRecord` per audio file. Files that cannot
/// be read are reported in `skipped` and never abort the scan.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> ScanReport {
    info!("scanning music directory: {}", dir.display());
    let mut report = ScanReport::default();

    for path in audio_files(dir, settings) {
        match read_record(&path) {
            Ok(record) => report.records.push(record),
            Err(e) => {
                warn!("{e}");
                report.skipped.push(e);
            }
        }
    }

    info!(
        found = report.records.len(),
        skipped = report.skipped.len(),
        "scan finished"
    );
    report
}

fn unreadable(path: &Path, reason: impl ToString) -> IngestError {
    IngestError::Unreadable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Read tags and file times for a single audio file.
pub fn read_record(path: &Path) -> Result<TrackRecord, IngestError> {
    let meta = fs::metadata(path).map_err(|e| unreadable(path, e))?;
    let tagged = lofty::read_from_path(path).map_err(|e| unreadable(path, e))?;

    let mut record = TrackRecord::new(path);
    record.modified_time = meta.modified().ok().map(DateTime::<Utc>::from);
    record.created_time = meta.created().ok().map(DateTime::<Utc>::from);

    let duration = tagged.properties().duration().as_secs_f64();
    if duration > 0.0 {
        record.duration = Some(duration);
    }

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        record.title = tag.title().map(|v| v.to_string());
        record.artist = tag.artist().map(|v| v.to_string());
        record.album = tag.album().map(|v| v.to_string());
        record.album_artist = tag.get_string(&ItemKey::AlbumArtist).map(str::to_string);
        record.year = tag.year().and_then(|y| i32::try_from(y).ok());
        record.track_number = tag.track();
        record.disc_number = tag.disk();
        record.bpm = tag
            .get_string(&ItemKey::Bpm)
            .or_else(|| tag.get_string(&ItemKey::IntegerBpm))
            .and_then(|v| v.trim().parse::<f64>().ok())
            .map(|v| v.round() as u32);

        for value in tag.get_strings(&ItemKey::Genre) {
            for genre in value.split(';') {
                let genre = genre.trim();
                if !genre.is_empty() {
                    record.genres.push(genre.to_string());
                }
            }
        }
    }

    Ok(record)
}
