//! Playlist generation: the strategy registry, the strategies themselves and
//! the engine that runs them over a library.

mod engine;
mod registry;
mod strategies;

pub use engine::{EngineSummary, PlaylistEngine};
pub use registry::{GeneratorEntry, Registry, StrategyKind};
pub use strategies::{GenerationContext, decade_buckets, decade_of, from_template, run};
