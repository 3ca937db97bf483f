//! In-memory collaborators for running the pipeline without an engine.
//!
//! [`TileLibrary`] maps archetypes to prefab names and tile-local surface
//! boxes; [`SceneRecorder`] keeps every decoration it is asked to create.

use atoll_terrain::{Placement, Rotation, SurfaceVolume, TileKind, TileLayout};
use glam::Vec3;
use hashbrown::HashMap;
use serde::Serialize;

use crate::services::{DecorationHandle, DecorationService, TileHandle, TileRequest, TileService};

/// Prefab used for archetypes without a registered representation.
pub const NONE_PREFAB: &str = "none";

/// One tile created by a [`TileLibrary`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TileInstance {
    pub prefab: String,
    pub layout: TileLayout,
    pub cell: (usize, usize),
    pub level: u32,
    pub world_position: Vec3,
    pub yaw_degrees: f32,
}

/// Turn a tile-local offset by the tile's rotation about +Y.
fn turn(v: Vec3, rotation: Rotation) -> Vec3 {
    (0..rotation.quarter_turns()).fold(v, |v, _| Vec3::new(-v.z, v.y, v.x))
}

/// Archetype table plus the tiles created from it.
#[derive(Clone, Debug, Default)]
pub struct TileLibrary {
    prefabs: HashMap<TileKind, String>,
    surfaces: HashMap<TileKind, Vec<SurfaceVolume>>,
    instances: Vec<TileInstance>,
    offline: bool,
}

impl TileLibrary {
    /// An empty library: every archetype falls back to [`NONE_PREFAB`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A library with a prefab for every archetype except `none`, named after
    /// the archetype, each with one walkable box covering the tile top.
    pub fn standard(tile_scale: Vec3) -> Self {
        let mut library = Self::new();
        let top = SurfaceVolume::new(
            "top",
            Vec3::new(0.0, tile_scale.y, 0.0),
            Vec3::new(tile_scale.x / 2.0, 0.0, tile_scale.z / 2.0),
        );
        for kind in TileKind::ALL {
            if kind == TileKind::None {
                continue;
            }
            library.register(kind, kind.name());
            library.add_surface(kind, top.clone());
        }
        library
    }

    /// Register the prefab for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: TileKind, prefab: impl Into<String>) {
        self.prefabs.insert(kind, prefab.into());
    }

    /// Add a tile-local surface box to `kind`.
    pub fn add_surface(&mut self, kind: TileKind, volume: SurfaceVolume) {
        self.surfaces.entry(kind).or_default().push(volume);
    }

    /// Make [`TileService::can_instantiate`] report `false`.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn prefab(&self, kind: TileKind) -> Option<&str> {
        self.prefabs.get(&kind).map(String::as_str)
    }

    pub fn instances(&self) -> &[TileInstance] {
        &self.instances
    }

    pub fn instance(&self, handle: TileHandle) -> Option<&TileInstance> {
        self.instances.get(handle.0 as usize)
    }
}

impl TileService for TileLibrary {
    fn can_instantiate(&self) -> bool {
        !self.offline
    }

    fn instantiate(&mut self, request: &TileRequest) -> TileHandle {
        let prefab = match self.prefabs.get(&request.layout.kind) {
            Some(prefab) => prefab.clone(),
            None => {
                if request.layout.kind != TileKind::None {
                    tracing::warn!(
                        kind = request.layout.kind.name(),
                        "no prefab registered for tile, using none"
                    );
                }
                NONE_PREFAB.to_string()
            }
        };

        let handle = TileHandle(self.instances.len() as u64);
        self.instances.push(TileInstance {
            prefab,
            layout: request.layout,
            cell: request.cell,
            level: request.level,
            world_position: request.world_position,
            yaw_degrees: request.yaw_degrees,
        });
        handle
    }

    fn surfaces(&self, handle: TileHandle) -> Vec<SurfaceVolume> {
        let Some(instance) = self.instance(handle) else {
            return Vec::new();
        };
        let Some(volumes) = self.surfaces.get(&instance.layout.kind) else {
            return Vec::new();
        };
        let rotation = instance.layout.rotation;
        volumes
            .iter()
            .map(|v| {
                let extents = turn(v.extents, rotation).abs();
                let center = instance.world_position + turn(v.center, rotation);
                SurfaceVolume::new(v.name.clone(), center, extents)
            })
            .collect()
    }
}

/// Records decoration requests in order.
#[derive(Clone, Debug, Default)]
pub struct SceneRecorder {
    placements: Vec<Placement>,
}

impl SceneRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of recorded instances of `prefab`.
    pub fn count(&self, prefab: &str) -> usize {
        self.placements.iter().filter(|p| p.prefab == prefab).count()
    }
}

impl DecorationService for SceneRecorder {
    fn instantiate(&mut self, placement: &Placement) -> DecorationHandle {
        let handle = DecorationHandle(self.placements.len() as u64);
        self.placements.push(placement.clone());
        handle
    }
}
