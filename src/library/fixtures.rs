//! Track-record builders shared by unit tests across the crate.

use chrono::{DateTime, TimeZone, Utc};

use super::{LibraryIndex, TrackRecord};

pub fn record(path: &str, artist: &str, genres: &[&str]) -> TrackRecord {
    TrackRecord {
        path: path.into(),
        title: Some(
            std::path::Path::new(path)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("untitled")
                .to_string(),
        ),
        artist: Some(artist.to_string()),
        album: Some(format!("{artist} LP")),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        duration: Some(200.0),
        ..TrackRecord::default()
    }
}

pub fn with_year(mut record: TrackRecord, year: i32) -> TrackRecord {
    record.year = Some(year);
    record
}

pub fn with_mtime(mut record: TrackRecord, secs: i64) -> TrackRecord {
    record.modified_time = Some(at(secs));
    record
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

/// `count` tracks for `artist` under `/music/<folder>/`, all tagged `genres`.
pub fn artist_tracks(
    artist: &str,
    folder: &str,
    genres: &[&str],
    count: usize,
) -> Vec<TrackRecord> {
    (0..count)
        .map(|i| format!("/music/{folder}/{artist} {i:02}.mp3"))
        .map(|path| record(&path, artist, genres))
        .collect()
}

pub fn index_of(records: Vec<TrackRecord>) -> LibraryIndex {
    let (index, rejected) = LibraryIndex::build(records);
    assert!(rejected.is_empty(), "rejected: {rejected:?}");
    index
}
