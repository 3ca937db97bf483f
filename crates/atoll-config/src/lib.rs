//! Configuration system for the island generator.
//!
//! Provides the per-run [`GeneratorSettings`] snapshot plus the debug and output
//! settings around it. Everything persists to disk as RON, supports CLI
//! overrides via clap, and deserializes forward/backward compatibly.

mod cli;
mod config;
mod error;
mod flora;
mod generator;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE, Config, DebugConfig, OutputConfig};
pub use error::ConfigError;
pub use flora::{FloraEntry, FloraSet};
pub use generator::{FloorSettings, GeneratorSettings, HeightfieldSettings, SteppingMode};
