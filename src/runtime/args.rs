use std::path::PathBuf;

use clap::Parser;

/// Generate balanced playlists from a music directory.
#[derive(Debug, Parser)]
#[command(name = "smartlists", version, about)]
pub struct Args {
    /// Directory to scan for audio files
    #[arg(default_value = "./music")]
    pub music_dir: PathBuf,
    /// Where the M3U files, the summary and the save document go
    #[arg(default_value = "./playlists")]
    pub output_dir: PathBuf,
    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}
