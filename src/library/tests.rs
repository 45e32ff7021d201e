use std::path::{Path, PathBuf};

use super::fixtures::{artist_tracks, index_of, record, with_mtime, with_year};
use super::*;
use crate::error::IngestError;

#[test]
fn ingest_rejects_only_an_empty_path() {
    let mut index = LibraryIndex::new();
    assert!(matches!(
        index.ingest(TrackRecord::default()),
        Err(IngestError::MissingPath)
    ));

    // No metadata at all still ingests with defaults.
    let mystery = TrackRecord::new("/music/Misc/mystery.flac");
    index.ingest(mystery).unwrap();
    index.finalize();

    let track = index.track(Path::new("/music/Misc/mystery.flac")).unwrap();
    assert_eq!(track.title, "mystery");
    assert_eq!(track.artist, UNKNOWN_ARTIST);
    assert_eq!(track.album, UNKNOWN_ALBUM);
    assert_eq!(track.album_artist, UNKNOWN_ARTIST);
    assert!(track.genres.is_empty());
    assert_eq!(track.year, None);
    assert_eq!(track.duration, 0.0);
    assert_eq!(track.folder, PathBuf::from("/music/Misc"));
}

#[test]
fn album_artist_falls_back_to_artist() {
    let index = index_of(vec![record("/music/a/1.mp3", "Blur", &["Britpop"])]);
    let track = index.track(Path::new("/music/a/1.mp3")).unwrap();
    assert_eq!(track.album_artist, "Blur");
}

#[test]
fn duplicate_paths_are_ignored() {
    let index = index_of(vec![
        record("/music/a/1.mp3", "Blur", &["Britpop"]),
        record("/music/a/1.mp3", "Oasis", &["Britpop"]),
    ]);
    assert_eq!(index.tracks().len(), 1);
    assert!(index.artist("Oasis").is_none());
}

#[test]
fn profiles_aggregate_genres_years_and_folders() {
    let index = index_of(vec![
        with_year(record("/music/x/1.mp3", "Blur", &["Britpop"]), 1994),
        with_year(record("/music/y/2.mp3", "Blur", &["Rock", "Britpop"]), 1997),
    ]);
    let blur = index.artist("Blur").unwrap();
    assert_eq!(blur.tracks.len(), 2);
    assert_eq!(
        blur.genres.iter().cloned().collect::<Vec<_>>(),
        vec!["Britpop".to_string(), "Rock".to_string()]
    );
    let years: Vec<_> = blur.years.iter().copied().collect();
    assert_eq!(years, vec![1994, 1997]);
    assert_eq!(blur.folders.len(), 2);
}

#[test]
fn untagged_artist_gets_folder_pseudo_genre() {
    let index = index_of(vec![
        record("/music/X/a.mp3", "Nameless", &[]),
        record("/music/Y/b.mp3", "Tagged", &["Jazz"]),
    ]);

    let artists = index.genres().get("folder:X").unwrap();
    assert!(artists.contains("Nameless"));
    let nameless = index.artist("Nameless").unwrap();
    assert!(nameless.genres.contains("folder:X"));
    // Tagged artists never get pseudo-genres.
    assert!(!index.genres().contains_key("folder:Y"));
}

#[test]
fn every_artist_belongs_to_a_genre_bucket() {
    let mut records = artist_tracks("A", "one", &[], 2);
    records.extend(artist_tracks("B", "two", &["Soul"], 2));
    let index = index_of(records);

    for profile in index.artists() {
        let mut buckets = index.genres().values();
        assert!(
            buckets.any(|artists| artists.contains(&profile.name)),
            "{} has no genre bucket",
            profile.name
        );
    }
}

#[test]
fn folder_cache_maps_folders_to_artists() {
    let index = index_of(vec![
        record("/music/mix/1.mp3", "A", &["Pop"]),
        record("/music/mix/2.mp3", "B", &["Pop"]),
        record("/music/solo/3.mp3", "A", &["Pop"]),
    ]);
    let mix = index.folders().get(Path::new("/music/mix")).unwrap();
    assert_eq!(mix.len(), 2);
    let solo = index.folders().get(Path::new("/music/solo")).unwrap();
    assert_eq!(solo.iter().collect::<Vec<_>>(), vec!["A"]);
}

#[test]
fn recently_added_sorts_by_mtime_descending_and_is_stable() {
    let index = index_of(vec![
        with_mtime(record("/m/old.mp3", "A", &[]), 100),
        with_mtime(record("/m/new.mp3", "A", &[]), 300),
        with_mtime(record("/m/tie1.mp3", "A", &[]), 200),
        with_mtime(record("/m/tie2.mp3", "A", &[]), 200),
    ]);
    let order: Vec<_> = index
        .recently_added()
        .iter()
        .map(|t| t.path.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        order,
        vec!["/m/new.mp3", "/m/tie1.mp3", "/m/tie2.mp3", "/m/old.mp3"]
    );
}

#[test]
fn artists_iterate_in_ingestion_order() {
    let index = index_of(vec![
        record("/m/1.mp3", "Zed", &[]),
        record("/m/2.mp3", "Abe", &[]),
        record("/m/3.mp3", "Zed", &[]),
    ]);
    let names: Vec<_> = index.artists().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Zed", "Abe"]);
    assert_eq!(index.artist("Abe").unwrap().rank, 1);
}

#[test]
fn finalize_twice_is_idempotent() {
    let mut index = index_of(vec![record("/music/X/a.mp3", "Nameless", &[])]);
    let before = index.genres().clone();
    index.finalize();
    assert_eq!(index.genres(), &before);
    assert_eq!(index.stats().genres, 1);
}

#[test]
fn main_genre_is_the_first_one_seen() {
    let index = index_of(vec![
        record("/music/s/1.mp3", "Slowdive", &["Shoegaze", "Alternative"]),
        record("/music/s/2.mp3", "Slowdive", &["Ambient", "Shoegaze"]),
        record("/music/n/1.mp3", "Nameless", &[]),
    ]);

    let slowdive = index.artist("Slowdive").unwrap();
    assert_eq!(slowdive.main_genre(), Some("Shoegaze"));
    assert_eq!(
        slowdive.genre_order,
        vec!["Shoegaze", "Alternative", "Ambient"]
    );
    let nameless = index.artist("Nameless").unwrap();
    assert_eq!(nameless.main_genre(), Some("folder:n"));
}

#[test]
fn track_without_parent_directory_lands_in_unknown_folder() {
    let index = index_of(vec![record("a.mp3", "Loose", &[])]);

    assert_eq!(folder_name(Path::new("")), UNKNOWN_FOLDER);
    assert!(index.genres().contains_key("folder:Unknown"));
    assert!(!index.genres().contains_key("folder:"));
}
