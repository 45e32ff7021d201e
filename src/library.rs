//! Library module: track model, the in-memory index the generators query,
//! and the filesystem scanner that feeds it.

mod index;
mod model;
mod scan;

pub use index::{ArtistProfile, LibraryIndex, LibraryStats, PSEUDO_GENRE_PREFIX};
pub use model::{Track, TrackRecord, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_FOLDER, folder_name};
pub use scan::{ScanReport, audio_files, read_record, scan};

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
mod tests;
