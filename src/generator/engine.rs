use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{GenerationSettings, LibrarySettings, SimilarityWeights};
use crate::error::{Error, IngestError, Result};
use crate::library::{self, LibraryIndex, LibraryStats, Track, TrackRecord};
use crate::persist::{self, ExportReport};
use crate::playlist::Playlist;
use crate::rules::Template;
use crate::sampler::Sampler;
use crate::similarity::SimilarityModel;

use super::registry::{GeneratorEntry, Registry};
use super::strategies::{self, GenerationContext};

/// Owns the library, the strategy registry and the generated playlists.
///
/// This is the surface a UI drives: scan, tune options, generate, edit
/// playlists by index, then export or save.
pub struct PlaylistEngine {
    settings: GenerationSettings,
    registry: Registry,
    index: LibraryIndex,
    similarity: SimilarityModel,
    sampler: Sampler,
    playlists: Vec<Playlist>,
}

impl PlaylistEngine {
    /// Randomness comes from `settings.seed` when set, from the OS otherwise.
    pub fn new(settings: GenerationSettings) -> Self {
        let sampler = match settings.seed {
            Some(seed) => Sampler::seeded(seed),
            None => Sampler::from_entropy(),
        };
        Self::with_sampler(settings, sampler)
    }

    pub fn with_sampler(settings: GenerationSettings, sampler: Sampler) -> Self {
        let mut engine = Self {
            similarity: SimilarityModel::new(settings.similarity_factors),
            settings,
            registry: Registry::new(),
            index: LibraryIndex::new(),
            sampler,
            playlists: Vec::new(),
        };
        engine.apply_include_flags();
        engine
    }

    fn apply_include_flags(&mut self) {
        self.registry
            .set_enabled("recentlyAdded", self.settings.include_recently_added);
        self.registry
            .set_enabled("decades", self.settings.include_year_based_playlists);
    }

    /// Replace the library with `records`. Rejected records are returned;
    /// they never stop the scan.
    pub fn scan(&mut self, records: impl IntoIterator<Item = TrackRecord>) -> Vec<IngestError> {
        let (index, rejected) = LibraryIndex::build(records);
        self.index = index;
        self.similarity.clear_cache();

        let stats = self.index.stats();
        info!(
            tracks = stats.tracks,
            artists = stats.artists,
            genres = stats.genres,
            "library indexed"
        );
        rejected
    }

    /// Walk `dir`, read tags and rebuild the library from what was found.
    pub fn scan_directory(&mut self, dir: &Path, settings: &LibrarySettings) -> Vec<IngestError> {
        let report = library::scan(dir, settings);
        let mut problems = report.skipped;
        problems.extend(self.scan(report.records));
        problems
    }

    pub fn library(&self) -> &LibraryIndex {
        &self.index
    }

    /// Run the enabled strategies by priority, stopping once the target
    /// playlist count is reached, then every configured template.
    /// Previously generated playlists are discarded first.
    pub fn generate(&mut self) -> &[Playlist] {
        self.playlists.clear();
        let target = self.settings.number_of_playlists;

        for kind in self.registry.ordered_enabled() {
            let produced = {
                let mut ctx = GenerationContext {
                    index: &self.index,
                    settings: &self.settings,
                    sampler: &mut self.sampler,
                    similarity: &mut self.similarity,
                    accepted: &self.playlists,
                };
                strategies::run(kind, &mut ctx)
            };
            info!(
                generator = kind.name(),
                playlists = produced.len(),
                "ran playlist generator"
            );
            self.playlists.extend(produced);

            if self.playlists.len() >= target {
                info!(target_count = target, "reached target playlist count");
                break;
            }
        }

        for template in &self.settings.playlist_templates {
            let result = {
                let mut ctx = GenerationContext {
                    index: &self.index,
                    settings: &self.settings,
                    sampler: &mut self.sampler,
                    similarity: &mut self.similarity,
                    accepted: &self.playlists,
                };
                strategies::from_template(template, &mut ctx)
            };
            match result {
                Ok(Some(playlist)) => self.playlists.push(playlist),
                Ok(None) => {}
                Err(e) => warn!(template = %template.name, error = %e, "skipping template"),
            }
        }

        info!(playlists = self.playlists.len(), "generation finished");
        &self.playlists
    }

    pub fn generators(&self) -> &[GeneratorEntry] {
        self.registry.entries()
    }

    /// Returns false when no generator has that name.
    pub fn enable_generator(&mut self, name: &str) -> bool {
        self.registry.enable(name)
    }

    pub fn disable_generator(&mut self, name: &str) -> bool {
        self.registry.disable(name)
    }

    pub fn set_generator_priority(&mut self, name: &str, priority: i32) -> bool {
        self.registry.set_priority(name, priority)
    }

    pub fn options(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Replace every option. The `include_*` flags re-enable or disable
    /// their strategies, and new weights drop cached similarity results.
    /// A new seed only takes effect for engines built afterwards.
    pub fn set_options(&mut self, settings: GenerationSettings) {
        self.similarity.set_weights(settings.similarity_factors);
        self.settings = settings;
        self.apply_include_flags();
    }

    pub fn set_similarity_weights(&mut self, weights: SimilarityWeights) {
        self.settings.similarity_factors = weights;
        self.similarity.set_weights(weights);
    }

    pub fn add_template(&mut self, template: Template) {
        self.settings.playlist_templates.push(template);
    }

    pub fn set_templates(&mut self, templates: Vec<Template>) {
        self.settings.playlist_templates = templates;
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn playlist(&self, index: usize) -> Result<&Playlist> {
        let len = self.playlists.len();
        self.playlists
            .get(index)
            .ok_or(Error::NotFound { index, len })
    }

    fn playlist_mut(&mut self, index: usize) -> Result<&mut Playlist> {
        let len = self.playlists.len();
        self.playlists
            .get_mut(index)
            .ok_or(Error::NotFound { index, len })
    }

    pub fn rename_playlist(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.playlist_mut(index)?.rename(name);
        Ok(())
    }

    pub fn describe_playlist(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> Result<()> {
        self.playlist_mut(index)?.set_description(description);
        Ok(())
    }

    /// Replace a playlist's tracks with the library tracks at `paths`.
    /// Paths the library does not know are dropped. Returns the new length.
    pub fn replace_playlist_tracks(&mut self, index: usize, paths: &[PathBuf]) -> Result<usize> {
        let len = self.playlists.len();
        if index >= len {
            return Err(Error::NotFound { index, len });
        }

        let tracks: Vec<Arc<Track>> = paths
            .iter()
            .filter_map(|p| self.index.track(p).cloned())
            .collect();
        if tracks.len() < paths.len() {
            debug!(
                unknown = paths.len() - tracks.len(),
                "ignoring paths that are not in the library"
            );
        }

        let playlist = self.playlist_mut(index)?;
        playlist.set_tracks(tracks);
        Ok(playlist.len())
    }

    /// Distinct artist names, sorted.
    pub fn artist_names(&self) -> Vec<String> {
        let mut names = self.index.artist_order().to_vec();
        names.sort();
        names
    }

    /// Distinct genre names (including pseudo-genres), sorted.
    pub fn genre_names(&self) -> Vec<String> {
        self.index.genres().keys().cloned().collect()
    }

    /// Write M3U files and the summary document into `dir`.
    pub fn export(&self, dir: &Path, summary_file_name: &str) -> Result<ExportReport> {
        let report = persist::export_playlists(dir, &self.playlists, summary_file_name)?;
        Ok(report)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        Ok(persist::save_playlists(path, &self.playlists)?)
    }

    /// Replace the current playlists with the ones saved at `path`.
    pub fn load(&mut self, path: &Path) -> Result<usize> {
        self.playlists = persist::load_playlists(path)?;
        Ok(self.playlists.len())
    }

    pub fn summary(&self) -> EngineSummary {
        let mut by_generator: BTreeMap<String, usize> = BTreeMap::new();
        for playlist in &self.playlists {
            let tag = playlist.generated_by().to_string();
            *by_generator.entry(tag).or_insert(0) += 1;
        }
        EngineSummary {
            library: self.index.stats(),
            playlists: self
                .playlists
                .iter()
                .map(|p| (p.name().to_string(), p.len(), p.artists().len()))
                .collect(),
            by_generator,
        }
    }
}

/// Library and playlist counts after a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSummary {
    pub library: LibraryStats,
    /// `(name, tracks, artists)` per playlist.
    pub playlists: Vec<(String, usize, usize)>,
    pub by_generator: BTreeMap<String, usize>,
}

impl fmt::Display for EngineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tracks in library: {}", self.library.tracks)?;
        writeln!(f, "Artists: {}", self.library.artists)?;
        writeln!(f, "Genres: {}", self.library.genres)?;
        writeln!(f, "Playlists created: {}", self.playlists.len())?;
        for (name, tracks, artists) in &self.playlists {
            writeln!(f, "- {name}: {tracks} tracks from {artists} artists")?;
        }
        writeln!(f, "By generator:")?;
        for (generator, count) in &self.by_generator {
            writeln!(f, "- {generator}: {count} playlists")?;
        }
        Ok(())
    }
}
