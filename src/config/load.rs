use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then lets environment
/// variables (prefix `SMARTLISTS__`) override it, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("SMARTLISTS")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let g = &self.generation;
        if g.min_tracks_per_playlist == 0 {
            return Err(
                "generation.min_tracks_per_playlist must be >= 1".to_string(),
            );
        }
        if g.max_tracks_per_playlist < g.min_tracks_per_playlist {
            return Err(format!(
                "generation.max_tracks_per_playlist ({}) must be >= min_tracks_per_playlist ({})",
                g.max_tracks_per_playlist, g.min_tracks_per_playlist
            ));
        }
        if g.max_tracks_per_artist_in_playlist == 0 {
            return Err(
                "generation.max_tracks_per_artist_in_playlist must be >= 1".to_string(),
            );
        }
        let w = g.similarity_factors;
        for (name, value) in [
            ("genre", w.genre),
            ("folder", w.folder),
            ("artist_name", w.artist_name),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "generation.similarity_factors.{name} must be >= 0, got {value}"
                ));
            }
        }
        Ok(())
    }

    /// Render the settings as TOML, in the same shape `load` reads.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Resolve the config path from `SMARTLISTS_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("SMARTLISTS_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/smartlists/config.toml`
/// or `~/.config/smartlists/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("smartlists").join("config.toml"))
}
