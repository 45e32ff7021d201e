//! Error kinds surfaced by the engine.
//!
//! Errors local to one unit of work (a file, a template, an exported playlist)
//! are reported and skipped by the caller that owns the batch. Only the
//! top-level `Error` is meant to reach the binary.

use std::path::PathBuf;

use thiserror::Error;

/// A track record that could not be turned into a library entry.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("track record has an empty path")]
    MissingPath,
    #[error("could not read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

/// A template (or one of its rules) that cannot be evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("template has no name")]
    MissingName,
    #[error("template {name:?} has no rules")]
    NoRules { name: String },
    #[error("unknown rule type {kind:?}")]
    UnknownRuleType { kind: String },
    #[error("rule of type {kind:?} is missing a value")]
    MissingValue { kind: String },
    #[error("invalid year value {value}")]
    InvalidYear { value: String },
    #[error("`between` needs a [min, max] pair, got {value}")]
    InvalidBetween { value: String },
    #[error("unknown year operator {operator:?}")]
    UnknownOperator { operator: String },
    #[error("no templates to combine")]
    NothingToCombine,
}

/// An I/O or encoding failure while writing or reading playlist files.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("playlist {index} not found ({len} playlists)")]
    NotFound { index: usize, len: usize },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
