//! The `atoll` binary: load config, generate, write artifacts.

use atoll_app::platform::PlatformDirs;
use atoll_app::{AppError, run_auto, run_once};
use atoll_config::{CliArgs, Config};
use clap::Parser;

fn run(args: &CliArgs) -> Result<(), AppError> {
    let dirs = match &args.config {
        Some(dir) => PlatformDirs::from_config_dir(dir.clone()),
        None => PlatformDirs::resolve()?,
    };
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(args);

    atoll_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    tracing::info!(config = %dirs.config_file().display(), "atoll starting");

    let out_dir = config.output.directory.clone();
    match args.auto {
        Some(runs) => {
            let reports = run_auto(&config, runs, &out_dir)?;
            for report in &reports {
                println!(
                    "seed {}: {} tiles, {} decorations",
                    report.island.seed, report.tiles_created, report.decorations_created
                );
            }
        }
        None => {
            let report = run_once(&config, args.new_seed, &out_dir)?;
            println!(
                "seed {}: {} land cells, {} tiles, {} decorations in {} ms",
                report.island.seed,
                report.island.land_cells(),
                report.tiles_created,
                report.decorations_created,
                report.island.elapsed.as_millis()
            );
            for path in &report.artifacts {
                println!("  {}", path.display());
            }
        }
    }
    Ok(())
}

fn main() {
    let args = CliArgs::parse();
    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "generation failed");
        eprintln!("atoll: {e}");
        std::process::exit(1);
    }
}
