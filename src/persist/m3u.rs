use std::fmt::Write as _;

use crate::playlist::Playlist;

const RESERVED: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Replace characters that are unsafe in file names with `_`.
///
/// Distinct names can collide after this (`a/b` and `a:b`); the exporter does
/// not disambiguate them.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect()
}

pub fn playlist_file_name(name: &str) -> String {
    format!("{}.m3u", sanitize_filename(name))
}

/// Extended M3U text for one playlist.
pub fn format_m3u(playlist: &Playlist) -> String {
    let mut out = String::from("#EXTM3U\n");
    // Writing into a String cannot fail.
    let _ = writeln!(out, "#PLAYLIST:{}", playlist.name());
    if !playlist.description().is_empty() {
        let _ = writeln!(out, "#EXTGENRE:{}", playlist.description());
    }

    for track in playlist.tracks() {
        let seconds = if track.duration > 0.0 {
            track.duration.round() as i64
        } else {
            -1
        };
        let _ = writeln!(out, "#EXTINF:{seconds},{} - {}", track.artist, track.title);
        if !track.album.is_empty() {
            let _ = writeln!(out, "#EXTALB:{}", track.album);
        }
        if let Some(year) = track.year {
            let _ = writeln!(out, "#EXTDATE:{year}");
        }
        if !track.genres.is_empty() {
            let _ = writeln!(out, "#EXTGENRE:{}", track.genres.join(", "));
        }
        let _ = writeln!(out, "{}", track.path.display());
    }
    out
}
