//! The playlist strategies. Each one reads the library through a
//! [`GenerationContext`] and returns the playlists it built; the pipeline
//! appends them.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::GenerationSettings;
use crate::error::TemplateError;
use crate::library::{LibraryIndex, PSEUDO_GENRE_PREFIX, Track, folder_name};
use crate::playlist::{Playlist, TEMPLATE_TAG};
use crate::rules::{Template, apply_rules, compile_template};
use crate::sampler::Sampler;
use crate::similarity::SimilarityModel;

use super::registry::StrategyKind;

/// Minimum distinct artists for a genre, folder or decade playlist.
const MIN_ARTISTS: usize = 3;
/// Share of tracks a folder playlist may share with an accepted one.
const FOLDER_OVERLAP_LIMIT: f64 = 0.7;
const SMART_MIX_MAX: usize = 5;
const SMART_MIX_SEED_MIN_TRACKS: usize = 5;
const SMART_MIX_SIMILAR_LIMIT: usize = 10;
const SMART_MIX_SIMILAR_MIN: usize = 3;

pub struct GenerationContext<'a> {
    pub index: &'a LibraryIndex,
    pub settings: &'a GenerationSettings,
    pub sampler: &'a mut Sampler,
    pub similarity: &'a mut SimilarityModel,
    /// Playlists accepted before this strategy ran.
    pub accepted: &'a [Playlist],
}

impl GenerationContext<'_> {
    fn has_budget(&self, produced: usize) -> bool {
        self.accepted.len() + produced < self.settings.number_of_playlists
    }

    fn big_enough(&self, tracks: &[Arc<Track>]) -> bool {
        tracks.len() >= self.settings.min_tracks_per_playlist
    }

    fn sample(&mut self, artists: &[String], pool: Option<&HashSet<PathBuf>>) -> Vec<Arc<Track>> {
        self.sampler.select_from_artists(
            self.index,
            artists,
            self.settings.max_tracks_per_artist_in_playlist,
            self.settings.max_tracks_per_playlist,
            pool,
        )
    }
}

pub fn run(kind: StrategyKind, ctx: &mut GenerationContext<'_>) -> Vec<Playlist> {
    match kind {
        StrategyKind::Genres => genres(ctx),
        StrategyKind::Folders => folders(ctx),
        StrategyKind::RecentlyAdded => recently_added(ctx),
        StrategyKind::Decades => decades(ctx),
        StrategyKind::SmartMix => smart_mix(ctx),
        StrategyKind::Coverage => coverage(ctx),
    }
}

fn path_pool(tracks: &[Arc<Track>]) -> HashSet<PathBuf> {
    tracks.iter().map(|t| t.path.clone()).collect()
}

fn genres(ctx: &mut GenerationContext<'_>) -> Vec<Playlist> {
    let index = ctx.index;
    let mut candidates: Vec<(&String, &BTreeSet<String>)> = index
        .genres()
        .iter()
        .filter(|(_, artists)| artists.len() >= MIN_ARTISTS)
        .collect();
    candidates.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let mut out = Vec::new();
    for (genre, artists) in candidates {
        if !ctx.has_budget(out.len()) {
            break;
        }
        let artists: Vec<String> = artists.iter().cloned().collect();
        let tracks = ctx.sample(&artists, None);
        if !ctx.big_enough(&tracks) {
            debug!(genre = %genre, tracks = tracks.len(), "genre mix too small");
            continue;
        }
        let label = genre.strip_prefix(PSEUDO_GENRE_PREFIX).unwrap_or(genre);
        out.push(Playlist::new(
            format!("Mix {label}"),
            format!("A mix of {genre} tracks from various artists"),
            tracks,
            StrategyKind::Genres.name(),
        ));
    }
    out
}

/// Share of `tracks` whose path also appears in `other`.
fn overlap_ratio(tracks: &[Arc<Track>], other: &Playlist) -> f64 {
    if tracks.is_empty() {
        return 0.0;
    }
    let shared = tracks
        .iter()
        .filter(|t| other.contains_path(&t.path))
        .count();
    shared as f64 / tracks.len() as f64
}

/// True when at least 70% of `tracks` already sit in one of `others`.
pub(super) fn is_near_duplicate<'p>(
    tracks: &[Arc<Track>],
    others: impl IntoIterator<Item = &'p Playlist>,
) -> bool {
    others
        .into_iter()
        .any(|p| overlap_ratio(tracks, p) >= FOLDER_OVERLAP_LIMIT)
}

fn folders(ctx: &mut GenerationContext<'_>) -> Vec<Playlist> {
    let index = ctx.index;
    let mut by_folder: BTreeMap<&Path, Vec<Arc<Track>>> = BTreeMap::new();
    for track in index.tracks() {
        by_folder
            .entry(track.folder.as_path())
            .or_default()
            .push(Arc::clone(track));
    }

    let mut out: Vec<Playlist> = Vec::new();
    for (folder, artists) in index.folders() {
        if !ctx.has_budget(out.len()) {
            break;
        }
        if artists.len() < MIN_ARTISTS {
            continue;
        }
        let Some(folder_tracks) = by_folder.get(folder.as_path()) else {
            continue;
        };
        if !ctx.big_enough(folder_tracks) {
            continue;
        }

        let pool = path_pool(folder_tracks);
        let artists: Vec<String> = artists.iter().cloned().collect();
        let tracks = ctx.sample(&artists, Some(&pool));
        if !ctx.big_enough(&tracks) {
            continue;
        }

        if is_near_duplicate(&tracks, ctx.accepted.iter().chain(out.iter())) {
            debug!(folder = %folder.display(), "folder mix overlaps an existing playlist");
            continue;
        }

        let name = folder_name(folder);
        out.push(Playlist::new(
            format!("Folder Mix: {name}"),
            format!("Tracks from the {name} folder"),
            tracks,
            StrategyKind::Folders.name(),
        ));
    }
    out
}

fn recently_added(ctx: &mut GenerationContext<'_>) -> Vec<Playlist> {
    let recent = ctx.index.recently_added();
    let head = &recent[..recent.len().min(ctx.settings.max_tracks_per_playlist)];
    if head.is_empty() || !ctx.big_enough(head) {
        return Vec::new();
    }
    vec![Playlist::new(
        "Recently Added",
        "Tracks that were recently added to your library",
        head.to_vec(),
        StrategyKind::RecentlyAdded.name(),
    )]
}

/// First year of the decade containing `year`.
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

/// Tracks with a known year, grouped by decade in ascending order.
pub fn decade_buckets(tracks: &[Arc<Track>]) -> BTreeMap<i32, Vec<Arc<Track>>> {
    let mut buckets: BTreeMap<i32, Vec<Arc<Track>>> = BTreeMap::new();
    for track in tracks {
        if let Some(year) = track.year {
            buckets
                .entry(decade_of(year))
                .or_default()
                .push(Arc::clone(track));
        }
    }
    buckets
}

fn decades(ctx: &mut GenerationContext<'_>) -> Vec<Playlist> {
    let mut out = Vec::new();
    for (decade, tracks) in decade_buckets(ctx.index.tracks()) {
        if !ctx.has_budget(out.len()) {
            break;
        }
        if !ctx.big_enough(&tracks) {
            continue;
        }
        let artists: Vec<String> = tracks
            .iter()
            .map(|t| t.artist.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if artists.len() < MIN_ARTISTS {
            continue;
        }

        let pool = path_pool(&tracks);
        let selected = ctx.sample(&artists, Some(&pool));
        if !ctx.big_enough(&selected) {
            continue;
        }
        out.push(Playlist::new(
            format!("{decade}s Mix"),
            format!("Music from the {decade}s"),
            selected,
            StrategyKind::Decades.name(),
        ));
    }
    out
}

fn smart_mix(ctx: &mut GenerationContext<'_>) -> Vec<Playlist> {
    let wanted = SMART_MIX_MAX.min(ctx.settings.number_of_playlists.div_ceil(4));
    let index = ctx.index;
    let mut seeds: Vec<String> = index
        .artists()
        .filter(|p| p.tracks.len() >= SMART_MIX_SEED_MIN_TRACKS)
        .map(|p| p.name.clone())
        .collect();
    if seeds.is_empty() || wanted == 0 {
        return Vec::new();
    }
    ctx.sampler.shuffle(&mut seeds);
    seeds.truncate(wanted * 2);

    let mut out = Vec::new();
    for seed in seeds {
        if out.len() >= wanted || !ctx.has_budget(out.len()) {
            break;
        }
        let similar = ctx
            .similarity
            .similar_artists(index, &seed, SMART_MIX_SIMILAR_LIMIT);
        if similar.len() < SMART_MIX_SIMILAR_MIN {
            debug!(seed = %seed, found = similar.len(), "not enough similar artists");
            continue;
        }

        let mut artists = Vec::with_capacity(similar.len() + 1);
        artists.push(seed.clone());
        artists.extend(similar);
        let tracks = ctx.sample(&artists, None);
        if !ctx.big_enough(&tracks) {
            continue;
        }

        let genre = index
            .artist(&seed)
            .and_then(|p| p.main_genre())
            .unwrap_or("Mix");
        out.push(Playlist::new(
            format!("{seed} & Similar Artists"),
            format!("A mix of {seed} and similar artists in the {genre} genre"),
            tracks,
            StrategyKind::SmartMix.name(),
        ));
    }
    out
}

fn coverage(ctx: &mut GenerationContext<'_>) -> Vec<Playlist> {
    let index = ctx.index;
    let covered: HashSet<&str> = ctx
        .accepted
        .iter()
        .flat_map(|p| p.artists().iter().map(String::as_str))
        .collect();
    let uncovered: Vec<&String> = index
        .artist_order()
        .iter()
        .filter(|a| !covered.contains(a.as_str()))
        .collect();
    if uncovered.is_empty() {
        return Vec::new();
    }
    debug!(count = uncovered.len(), "artists not yet in any playlist");

    let max = ctx.settings.max_tracks_per_playlist;
    let mut out = Vec::new();
    let mut current: Vec<Arc<Track>> = Vec::new();

    let discover = |number: usize, tracks: Vec<Arc<Track>>| {
        Playlist::new(
            format!("Discover Mix {number}"),
            "A mix of artists you might not listen to often",
            tracks,
            StrategyKind::Coverage.name(),
        )
    };

    for artist in uncovered {
        let Some(profile) = index.artist(artist) else {
            continue;
        };
        if profile.tracks.is_empty() {
            continue;
        }
        let take = ctx
            .settings
            .max_tracks_per_artist_in_playlist
            .min(profile.tracks.len())
            .min(max);
        let picked = ctx.sampler.select_random(&profile.tracks, take);

        if current.len() + picked.len() > max {
            let full = std::mem::replace(&mut current, picked);
            if ctx.big_enough(&full) {
                out.push(discover(out.len() + 1, full));
            }
        } else {
            current.extend(picked);
        }
    }
    if ctx.big_enough(&current) {
        out.push(discover(out.len() + 1, current));
    }
    out
}

/// Build the playlist for one template. `Ok(None)` when the library does not
/// have enough matching tracks.
pub fn from_template(
    template: &Template,
    ctx: &mut GenerationContext<'_>,
) -> Result<Option<Playlist>, TemplateError> {
    let rules = compile_template(template)?;
    let matching = apply_rules(ctx.index.tracks(), &rules);
    if !ctx.big_enough(&matching) {
        debug!(
            template = %template.name,
            matching = matching.len(),
            "not enough tracks for template"
        );
        return Ok(None);
    }

    let artists: Vec<String> = matching
        .iter()
        .map(|t| t.artist.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let pool = path_pool(&matching);
    let tracks = ctx.sample(&artists, Some(&pool));
    if !ctx.big_enough(&tracks) {
        debug!(template = %template.name, selected = tracks.len(), "template selection too small");
        return Ok(None);
    }

    let description = template
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("Custom playlist: {}", template.name));
    Ok(Some(Playlist::new(
        template.name.clone(),
        description,
        tracks,
        TEMPLATE_TAG,
    )))
}
