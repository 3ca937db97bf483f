//! Staged island generation: heightfield, terraces, ramps, tiles, floor and
//! decoration, wired to host collaborators.

mod background;
mod cancel;
mod error;
mod generator;
mod services;

pub mod headless;

pub use background::{BackgroundGenerator, FinishedRun};
pub use cancel::{CancelToken, RunSupervisor};
pub use error::GenerationError;
pub use generator::{Host, Island, IslandGenerator, PlacedTile, Stage, tile_world_position};
pub use headless::{NONE_PREFAB, SceneRecorder, TileInstance, TileLibrary};
pub use services::{DecorationHandle, DecorationService, TileHandle, TileRequest, TileService};
