use serde::{Deserialize, Serialize};

use crate::rules::Template;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/smartlists/config.toml`
/// or `~/.config/smartlists/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SMARTLISTS__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub generation: GenerationSettings,
    pub library: LibrarySettings,
    pub output: OutputSettings,
}

/// Options consumed by the generator pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Playlists with fewer tracks than this are never surfaced.
    pub min_tracks_per_playlist: usize,
    /// Upper bound on tracks in a single playlist.
    pub max_tracks_per_playlist: usize,
    /// Upper bound on tracks by one artist inside a sampled playlist.
    pub max_tracks_per_artist_in_playlist: usize,
    /// Target playlist count. The pipeline stops once it is reached.
    pub number_of_playlists: usize,
    /// Enables the `decades` strategy.
    pub include_year_based_playlists: bool,
    /// Enables the `recentlyAdded` strategy.
    pub include_recently_added: bool,
    pub similarity_factors: SimilarityWeights,
    /// User templates, run after the strategy pipeline.
    pub playlist_templates: Vec<Template>,
    /// Fixed RNG seed. Leave unset for a different mix on every run.
    pub seed: Option<u64>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            min_tracks_per_playlist: 30,
            max_tracks_per_playlist: 50,
            max_tracks_per_artist_in_playlist: 5,
            number_of_playlists: 8,
            include_year_based_playlists: true,
            include_recently_added: true,
            similarity_factors: SimilarityWeights::default(),
            playlist_templates: Vec::new(),
            seed: None,
        }
    }
}

/// Weights of the three artist-similarity factors.
///
/// They are not normalized: a total above 1.0 simply scales every score.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub genre: f64,
    pub folder: f64,
    #[serde(alias = "artistName")]
    pub artist_name: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            genre: 0.5,
            folder: 0.3,
            artist_name: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: ["mp3", "flac", "m4a", "wav", "ogg", "aac"]
                .into_iter()
                .map(String::from)
                .collect(),
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Name of the export summary written next to the M3U files.
    pub summary_file_name: String,
    /// Name of the full save document written next to the M3U files.
    pub save_file_name: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            summary_file_name: "playlist_config.json".to_string(),
            save_file_name: "playlists.json".to_string(),
        }
    }
}
