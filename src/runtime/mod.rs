//! The `smartlists` binary: scan a directory, generate, export and save.

use clap::Parser;
use tracing::{info, warn};

use crate::generator::PlaylistEngine;

mod args;
mod logging;
mod settings;

use args::Args;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args = Args::parse();

    let settings = settings::load_settings();
    if args.print_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    if !args.music_dir.is_dir() {
        let dir = args.music_dir.display();
        return Err(format!("music directory {dir} does not exist").into());
    }

    let mut engine = PlaylistEngine::new(settings.generation.clone());
    let problems = engine.scan_directory(&args.music_dir, &settings.library);
    for problem in &problems {
        warn!(error = %problem, "skipped file");
    }

    engine.generate();

    let report = engine.export(&args.output_dir, &settings.output.summary_file_name)?;
    for failure in &report.failures {
        warn!(error = %failure, "export incomplete");
    }
    engine.save(&args.output_dir.join(&settings.output.save_file_name))?;

    let summary = engine.summary();
    info!(
        tracks = summary.library.tracks,
        playlists = summary.playlists.len(),
        files = report.written.len(),
        "playlists generated"
    );
    print!("{summary}");
    Ok(())
}
