//! Host-side collaborators the pipeline hands its results to.

use atoll_terrain::{Placement, SurfaceVolume, TileLayout};
use glam::Vec3;
use serde::Serialize;

/// Opaque reference to an instantiated tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TileHandle(pub u64);

/// Opaque reference to an instantiated decoration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DecorationHandle(pub u64);

/// Everything a tile service needs to place one tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileRequest {
    pub layout: TileLayout,
    /// `(x, y)` cell on the heightfield.
    pub cell: (usize, usize),
    /// Terrace level of the cell, always at least 1.
    pub level: u32,
    pub world_position: Vec3,
    /// Rotation about +Y in degrees.
    pub yaw_degrees: f32,
}

/// Creates tile instances and answers surface queries for flora sampling.
pub trait TileService {
    /// Whether the host is currently able to create instances.
    fn can_instantiate(&self) -> bool {
        true
    }

    /// Create one tile. An archetype without a registered representation
    /// must fall back to the `none` representation and warn.
    fn instantiate(&mut self, request: &TileRequest) -> TileHandle;

    /// World-space walkable surface volumes of an instantiated tile.
    fn surfaces(&self, handle: TileHandle) -> Vec<SurfaceVolume>;
}

/// Creates decoration instances (border rocks and flora).
pub trait DecorationService {
    fn instantiate(&mut self, placement: &Placement) -> DecorationHandle;
}
