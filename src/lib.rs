//! Balanced, bounded playlists generated from a local music library.
//!
//! The [`PlaylistEngine`] indexes track records, runs a prioritized set of
//! generation strategies plus user templates, and hands back playlists that
//! can be edited, exported as M3U or saved for a later session.

pub mod config;
pub mod error;
pub mod generator;
pub mod library;
pub mod persist;
pub mod playlist;
pub mod rules;
pub mod runtime;
pub mod sampler;
pub mod similarity;

pub use config::{GenerationSettings, Settings, SimilarityWeights};
pub use error::{Error, Result};
pub use generator::{EngineSummary, PlaylistEngine, StrategyKind};
pub use library::{LibraryIndex, Track, TrackRecord};
pub use playlist::Playlist;
pub use rules::{RuleSpec, Template};
