//! The `atoll` command-line generator: configuration, runs and artifacts.

pub mod artifacts;
pub mod platform;

use std::path::{Path, PathBuf};
use std::time::Duration;

use atoll_config::{Config, ConfigError, GeneratorSettings};
use atoll_island::{
    BackgroundGenerator, GenerationError, Host, Island, IslandGenerator, SceneRecorder, Stage,
    TileLibrary,
};
use atoll_terrain::debug_viz::ImageError;
use glam::Vec3;

use crate::platform::PlatformError;

/// Longest wait for one automatic run.
const AUTO_RUN_TIMEOUT: Duration = Duration::from_secs(600);

/// Everything that can stop the binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("failed to encode summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("automatic run {run} did not finish in time")]
    Timeout { run: u64 },

    #[error("failed to start the generation worker: {0}")]
    Worker(#[source] std::io::Error),
}

/// One finished run and where its artifacts went.
#[derive(Debug)]
pub struct RunReport {
    pub island: Island,
    pub tiles_created: usize,
    pub decorations_created: usize,
    pub artifacts: Vec<PathBuf>,
}

/// Generate once in the calling thread and write artifacts to `dir`.
pub fn run_once(config: &Config, force_new_seed: bool, dir: &Path) -> Result<RunReport, AppError> {
    let settings = &config.generator;
    let mut tiles = TileLibrary::standard(Vec3::from_array(settings.tile_scale));
    let mut decorations = SceneRecorder::new();
    let mut report_stage = |stage: Stage| tracing::info!(%stage, "stage started");

    let island = {
        let mut host = Host::new()
            .with_tiles(&mut tiles)
            .with_decorations(&mut decorations)
            .with_progress(&mut report_stage);
        IslandGenerator::new(settings.clone())
            .with_print_output(config.debug.print_output)
            .generate(force_new_seed, &mut host)?
    };

    let artifacts = artifacts::write_artifacts(&island, settings, &config.output, dir)?;
    Ok(RunReport {
        island,
        tiles_created: tiles.instances().len(),
        decorations_created: decorations.len(),
        artifacts,
    })
}

/// Regenerate `runs` times on the background worker with fresh seeds and
/// navmesh baking off. Run `i` writes into `dir/run_<i>`.
pub fn run_auto(config: &Config, runs: u32, dir: &Path) -> Result<Vec<RunReport>, AppError> {
    let settings: GeneratorSettings = config.generator.for_auto_regeneration();
    let mut worker = BackgroundGenerator::new().map_err(AppError::Worker)?;
    let mut reports = Vec::with_capacity(runs as usize);

    for index in 0..runs {
        worker.submit(settings.clone(), true);
        let Some(finished) = worker.wait(AUTO_RUN_TIMEOUT) else {
            // Stop the stuck run at its next stage boundary before bailing out.
            worker.cancel();
            return Err(AppError::Timeout {
                run: worker.latest_run(),
            });
        };
        let run = finished.run;
        let island = finished.result?;

        let run_dir = dir.join(format!("run_{:03}", index + 1));
        let artifacts = artifacts::write_artifacts(&island, &settings, &config.output, &run_dir)?;
        tracing::info!(run, seed = island.seed, tiles = island.tiles.len(), "automatic run finished");
        reports.push(RunReport {
            tiles_created: finished.tiles.instances().len(),
            decorations_created: finished.decorations.len(),
            island,
            artifacts,
        });
    }
    Ok(reports)
}
