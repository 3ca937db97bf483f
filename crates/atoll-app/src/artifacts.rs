//! Diagnostic artifacts written after a run.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use atoll_config::{GeneratorSettings, OutputConfig};
use atoll_island::{Island, PlacedTile, Stage};
use atoll_terrain::debug_viz::{render_floor_preview, render_stepped_heightfield};
use atoll_terrain::{Placement, RampSpot};
use glam::Vec3;
use serde::Serialize;

use crate::AppError;

/// Floor mesh statistics for the summary.
#[derive(Debug, Serialize)]
pub struct FloorSummary {
    pub quads: usize,
    pub vertices: usize,
    pub border_points: usize,
    pub bounds_min: Option<Vec3>,
    pub bounds_max: Option<Vec3>,
    pub offset: Vec3,
}

/// JSON summary of one island.
#[derive(Debug, Serialize)]
pub struct IslandSummary<'a> {
    pub seed: u32,
    pub width: usize,
    pub height: usize,
    pub max_height: u32,
    pub land_cells: usize,
    /// Cell count per terrace level, index 0 is void.
    pub levels: Vec<usize>,
    pub completed: Stage,
    pub elapsed_ms: u128,
    pub bake_navmesh: bool,
    pub ramps: &'a [RampSpot],
    pub tiles: &'a [PlacedTile],
    pub floor: Option<FloorSummary>,
    pub border_rocks: &'a [Placement],
    pub flora: &'a [Placement],
}

impl<'a> IslandSummary<'a> {
    pub fn new(island: &'a Island, settings: &GeneratorSettings) -> Self {
        let max_height = settings.heightfield.max_height;
        let mut levels = vec![0; max_height as usize + 1];
        for (_, _, level) in island.stepped.iter() {
            if let Some(count) = levels.get_mut(*level as usize) {
                *count += 1;
            }
        }

        let floor = island.floor.as_ref().map(|mesh| {
            let bounds = mesh.bounds();
            FloorSummary {
                quads: mesh.quad_count(),
                vertices: mesh.vertex_count(),
                border_points: island.border.len(),
                bounds_min: bounds.map(|b| b.min),
                bounds_max: bounds.map(|b| b.max),
                offset: mesh.offset,
            }
        });

        let (width, height) = island.stepped.dimensions();
        Self {
            seed: island.seed,
            width,
            height,
            max_height,
            land_cells: island.land_cells(),
            levels,
            completed: island.completed,
            elapsed_ms: island.elapsed.as_millis(),
            bake_navmesh: island.bake_navmesh,
            ramps: island.ramps.as_slice(),
            tiles: &island.tiles,
            floor,
            border_rocks: &island.border_rocks,
            flora: &island.flora,
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, AppError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| AppError::Write {
            path: path.to_path_buf(),
            source,
        })
}

fn write_error(path: &Path) -> impl FnOnce(io::Error) -> AppError + '_ {
    move |source| AppError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Write the artifacts enabled in `output` into `dir`. Returns the paths
/// written.
pub fn write_artifacts(
    island: &Island,
    settings: &GeneratorSettings,
    output: &OutputConfig,
    dir: &Path,
) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir).map_err(write_error(dir))?;
    let mut written = Vec::new();

    if output.heightfield_png {
        let path = dir.join("heightfield.png");
        render_stepped_heightfield(&island.stepped, settings.heightfield.max_height)
            .save_png(&path)?;
        written.push(path);
    }

    if output.floor_preview_png {
        let path = dir.join("floor_preview.png");
        render_floor_preview(&island.heightfield, &island.stepped, settings.floor.subdivision)
            .save_png(&path)?;
        written.push(path);
    }

    if output.floor_obj
        && let Some(mesh) = &island.floor
    {
        let path = dir.join("floor.obj");
        mesh.write_obj(create(&path)?).map_err(write_error(&path))?;
        written.push(path);
    }

    if output.summary_json {
        let path = dir.join("island.json");
        let mut out = create(&path)?;
        serde_json::to_writer_pretty(&mut out, &IslandSummary::new(island, settings))?;
        out.flush().map_err(write_error(&path))?;
        written.push(path);
    }

    for path in &written {
        tracing::debug!(path = %path.display(), "wrote artifact");
    }
    Ok(written)
}
