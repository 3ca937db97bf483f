//! The staged island pipeline.
//!
//! A run goes heightfield, smoothing, stepping, ramps, tiles, floor, border
//! and flora, each stage consuming the previous one's output. One
//! [`RandomBatch`] is threaded through every stage that draws, so the call
//! order below is part of the output's identity.

use std::fmt;
use std::time::{Duration, Instant};

use atoll_config::GeneratorSettings;
use atoll_mesh::{FloorMesh, build_floor_mesh, draw_floor_noise_offset};
use atoll_terrain::flora::{gather_tile_candidates, place_border_rocks, place_surface_flora};
use atoll_terrain::{
    Grid, Placement, RampSpots, RandomBatch, TileLayout, draw_heightfield_offset,
    generate_heightfield, mark_ramps, resolve_layout, seed_from_clock, smooth_heightfield,
    step_heightfield,
};
use glam::Vec3;
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::error::GenerationError;
use crate::services::{DecorationService, TileHandle, TileRequest, TileService};

/// Pipeline stages in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Heightfield,
    Smoothing,
    Stepping,
    Ramps,
    Tiles,
    Floor,
    Border,
    Flora,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Self::Heightfield,
        Self::Smoothing,
        Self::Stepping,
        Self::Ramps,
        Self::Tiles,
        Self::Floor,
        Self::Border,
        Self::Flora,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Heightfield => "heightfield",
            Self::Smoothing => "smoothing",
            Self::Stepping => "stepping",
            Self::Ramps => "ramps",
            Self::Tiles => "tiles",
            Self::Floor => "floor",
            Self::Border => "border",
            Self::Flora => "flora",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Collaborators supplied by the caller for one run. All are optional; the
/// stages that need a missing one either fail or skip, as documented on
/// [`IslandGenerator::generate`].
#[derive(Default)]
pub struct Host<'a> {
    pub tiles: Option<&'a mut dyn TileService>,
    pub decorations: Option<&'a mut dyn DecorationService>,
    pub cancel: Option<CancelToken>,
    pub progress: Option<&'a mut dyn FnMut(Stage)>,
}

impl<'a> Host<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tiles(mut self, tiles: &'a mut dyn TileService) -> Self {
        self.tiles = Some(tiles);
        self
    }

    pub fn with_decorations(mut self, decorations: &'a mut dyn DecorationService) -> Self {
        self.decorations = Some(decorations);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, progress: &'a mut dyn FnMut(Stage)) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Check the token and announce `stage`.
    fn enter(&mut self, stage: Stage) -> Result<(), GenerationError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            tracing::info!(%stage, "generation cancelled");
            return Err(GenerationError::Cancelled(stage));
        }
        tracing::debug!(%stage, "entering stage");
        if let Some(progress) = self.progress.as_deref_mut() {
            progress(stage);
        }
        Ok(())
    }

    fn decorate(&mut self, placements: &[Placement]) {
        if let Some(decorations) = self.decorations.as_mut() {
            for placement in placements {
                decorations.instantiate(placement);
            }
        }
    }
}

/// A tile handed to the tile service.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedTile {
    pub layout: TileLayout,
    pub cell: (usize, usize),
    pub level: u32,
    pub world_position: Vec3,
    pub yaw_degrees: f32,
    pub handle: TileHandle,
}

/// Everything a run produced. Stages that did not run leave their fields
/// empty.
#[derive(Clone, Debug)]
pub struct Island {
    pub seed: u32,
    /// Continuous heightfield after smoothing.
    pub heightfield: Grid<f32>,
    /// Terrace levels; 0 is void.
    pub stepped: Grid<u32>,
    pub ramps: RampSpots,
    pub tiles: Vec<PlacedTile>,
    pub floor: Option<FloorMesh>,
    /// Floor border points in the floor-local frame.
    pub border: Vec<Vec3>,
    pub border_rocks: Vec<Placement>,
    pub flora: Vec<Placement>,
    /// The host should bake a navigation mesh for this island.
    pub bake_navmesh: bool,
    /// Last stage that finished.
    pub completed: Stage,
    pub elapsed: Duration,
}

impl Island {
    /// Number of land cells.
    pub fn land_cells(&self) -> usize {
        self.stepped.iter().filter(|(_, _, level)| **level > 0).count()
    }
}

/// World position of the tile on `(x, y)` at `level`, centred on the origin.
pub fn tile_world_position(width: usize, height: usize, x: usize, y: usize, level: u32, scale: Vec3) -> Vec3 {
    let centring = Vec3::new(
        -(width as f32 - 1.0) * 0.5,
        0.0,
        -(height as f32 - 1.0) * 0.5,
    );
    scale * (Vec3::new(x as f32, level as f32 - 1.0, y as f32) + centring)
}

/// Generates islands from a settings snapshot.
#[derive(Clone, Debug)]
pub struct IslandGenerator {
    seed: Option<u32>,
    settings: GeneratorSettings,
    print_output: bool,
}

impl IslandGenerator {
    /// A zero seed in the settings counts as unset.
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            seed: settings.seed.filter(|seed| *seed != 0),
            settings,
            print_output: false,
        }
    }

    /// Dump the intermediate grids through the diagnostic gate.
    pub fn with_print_output(mut self, print_output: bool) -> Self {
        self.print_output = print_output;
        self
    }

    /// Seed of the last run, or the configured one before any run.
    pub fn seed(&self) -> Option<u32> {
        self.seed
    }

    /// Run the pipeline.
    ///
    /// A new seed is taken from the clock when none is set or when
    /// `force_new_seed` is true; it is kept for later runs. With tile
    /// generation disabled the run ends after the ramp stage. Tile generation
    /// fails without a usable tile service, and decoration fails without a
    /// flora set. Flora needs placed tiles and border rocks need the floor,
    /// so those stages only run after theirs.
    pub fn generate(&mut self, force_new_seed: bool, host: &mut Host<'_>) -> Result<Island, GenerationError> {
        let started = Instant::now();
        self.settings.validate()?;

        let seed = match self.seed {
            Some(seed) if !force_new_seed => seed,
            _ => seed_from_clock(),
        };
        self.seed = Some(seed);
        tracing::info!(seed, "generating island");

        let settings = &self.settings;
        let hf = &settings.heightfield;
        let mut batch = RandomBatch::for_run(seed);

        host.enter(Stage::Heightfield)?;
        let offset = draw_heightfield_offset(&mut batch);
        let mut heightfield = generate_heightfield(hf, offset);

        if settings.do_heightfield_smoothing {
            host.enter(Stage::Smoothing)?;
            heightfield = smooth_heightfield(&heightfield, settings.smooth_iterations);
        }
        let (width, height) = heightfield.dimensions();
        if self.print_output {
            atoll_log::log_grid(1, "continuous heightfield", width, height, |x, y| {
                format!("{:.3}", heightfield[(x, y)])
            });
        }

        host.enter(Stage::Stepping)?;
        let stepped = step_heightfield(&heightfield, hf.max_height, settings.stepping_mode);
        let mut completed = Stage::Stepping;
        if self.print_output {
            atoll_log::log_grid(1, "stepped heightfield", width, height, |x, y| stepped[(x, y)]);
        }

        let ramps = if settings.do_ramp_generation {
            host.enter(Stage::Ramps)?;
            completed = Stage::Ramps;
            mark_ramps(&stepped, settings.ramp_ratio, &mut batch)
        } else {
            RampSpots::default()
        };

        let mut island = Island {
            seed,
            heightfield,
            stepped,
            ramps,
            tiles: Vec::new(),
            floor: None,
            border: Vec::new(),
            border_rocks: Vec::new(),
            flora: Vec::new(),
            bake_navmesh: false,
            completed,
            elapsed: Duration::ZERO,
        };

        if !settings.do_tile_generation {
            island.elapsed = started.elapsed();
            tracing::info!(
                seed,
                elapsed_ms = island.elapsed.as_millis() as u64,
                "tile generation disabled, stopping after layout"
            );
            return Ok(island);
        }

        host.enter(Stage::Tiles)?;
        let scale = Vec3::from_array(settings.tile_scale);
        {
            let tiles = host.tiles.as_deref_mut().ok_or(GenerationError::MissingTileService)?;
            if !tiles.can_instantiate() {
                return Err(GenerationError::HostCannotInstantiate);
            }
            for x in 0..width {
                for y in 0..height {
                    let level = island.stepped[(x, y)];
                    if level == 0 {
                        continue;
                    }
                    let layout = resolve_layout(&island.stepped, &island.ramps, x, y);
                    let request = TileRequest {
                        layout,
                        cell: (x, y),
                        level,
                        world_position: tile_world_position(width, height, x, y, level, scale),
                        yaw_degrees: layout.rotation.yaw_degrees(),
                    };
                    let handle = tiles.instantiate(&request);
                    island.tiles.push(PlacedTile {
                        layout,
                        cell: request.cell,
                        level,
                        world_position: request.world_position,
                        yaw_degrees: request.yaw_degrees,
                        handle,
                    });
                }
            }
        }
        island.completed = Stage::Tiles;
        tracing::info!(tiles = island.tiles.len(), "placed tiles");

        if settings.do_floor_generation {
            host.enter(Stage::Floor)?;
            let noise_offset = draw_floor_noise_offset(&mut batch);
            let floor = build_floor_mesh(
                &island.stepped,
                &island.heightfield,
                &settings.floor,
                scale,
                noise_offset,
            );
            island.border = floor.border;
            island.completed = Stage::Floor;

            if settings.do_floor_border_generation {
                host.enter(Stage::Border)?;
                let floraset = settings
                    .floraset
                    .as_ref()
                    .ok_or(GenerationError::MissingFloraSet(Stage::Border))?;
                island.border_rocks =
                    place_border_rocks(&island.border, floor.mesh.offset, floraset, &mut batch);
                host.decorate(&island.border_rocks);
                island.completed = Stage::Border;
            }
            island.floor = Some(floor.mesh);
        }

        if settings.do_beautification {
            host.enter(Stage::Flora)?;
            let floraset = settings
                .floraset
                .as_ref()
                .ok_or(GenerationError::MissingFloraSet(Stage::Flora))?;

            let mut candidates = Vec::new();
            if let Some(tiles) = host.tiles.as_deref() {
                for tile in &island.tiles {
                    let label = format!(
                        "Tile_{}_{}_{}_{}",
                        tile.cell.0, tile.cell.1, tile.layout.kind, tile.layout.rotation
                    );
                    let volumes = tiles.surfaces(tile.handle);
                    gather_tile_candidates(&label, &volumes, floraset.density, &mut batch, &mut candidates);
                }
            }
            let spots = candidates.len();
            island.flora = place_surface_flora(candidates, floraset, &mut batch);
            tracing::info!(flora = island.flora.len(), spots, "placed flora");
            host.decorate(&island.flora);
            island.completed = Stage::Flora;
        }

        if settings.do_navmesh_generation {
            island.bake_navmesh = true;
            tracing::debug!("navmesh bake requested");
        }

        island.elapsed = started.elapsed();
        tracing::info!(
            seed,
            elapsed_ms = island.elapsed.as_millis() as u64,
            "finished generation"
        );
        Ok(island)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_world_position_is_centred() {
        let scale = Vec3::splat(4.0);
        assert_eq!(tile_world_position(5, 5, 2, 2, 1, scale), Vec3::ZERO);
        assert_eq!(
            tile_world_position(5, 5, 0, 4, 3, scale),
            Vec3::new(-8.0, 8.0, 8.0)
        );
        assert_eq!(
            tile_world_position(4, 2, 0, 0, 1, scale),
            Vec3::new(-6.0, 0.0, -2.0)
        );
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::ALL.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Stage::Border.to_string(), "border");
    }

    #[test]
    fn test_zero_seed_is_unset() {
        let settings = GeneratorSettings {
            seed: Some(0),
            ..GeneratorSettings::default()
        };
        assert_eq!(IslandGenerator::new(settings).seed(), None);
    }

    #[test]
    fn test_cancelled_token_stops_first_stage() {
        let token = CancelToken::new();
        token.cancel();
        let mut host = Host::new().with_cancel(token);
        let mut generator = IslandGenerator::new(GeneratorSettings {
            seed: Some(9),
            ..GeneratorSettings::default()
        });
        let err = generator.generate(false, &mut host).unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled(Stage::Heightfield)));
    }
}
