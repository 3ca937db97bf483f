//! Command-line argument parsing for the island generator.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;
use crate::generator::SteppingMode;

/// Island generator command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "atoll", about = "Procedural tile-based island generator")]
pub struct CliArgs {
    /// Fixed seed for reproducible generation.
    #[arg(short, long)]
    pub seed: Option<u32>,

    /// Ignore any configured seed and derive a new one from the clock.
    #[arg(long)]
    pub new_seed: bool,

    /// Grid width in tiles.
    #[arg(long)]
    pub width: Option<u32>,

    /// Grid height in tiles.
    #[arg(long)]
    pub height: Option<u32>,

    /// Highest terrace level.
    #[arg(long)]
    pub max_height: Option<u32>,

    /// Smoothing passes (0 disables smoothing).
    #[arg(long)]
    pub smooth_iterations: Option<u32>,

    /// Rounding used when stepping heights.
    #[arg(long, value_parser = parse_stepping_mode)]
    pub stepping: Option<SteppingMode>,

    /// Share of surplus ramp candidates to keep (0.0 - 1.0).
    #[arg(long)]
    pub ramp_ratio: Option<f32>,

    /// Floor quads per cell edge.
    #[arg(long)]
    pub floor_subdivision: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Diagnostics with a priority above this are suppressed.
    #[arg(long)]
    pub verbosity: Option<u8>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output directory for generated artifacts.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Regenerate this many times with fresh seeds (navmesh baking is disabled).
    #[arg(long)]
    pub auto: Option<u32>,
}

fn parse_stepping_mode(s: &str) -> Result<SteppingMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "round" => Ok(SteppingMode::Round),
        "floor" => Ok(SteppingMode::Floor),
        "ceil" => Ok(SteppingMode::Ceil),
        other => Err(format!("unknown stepping mode `{other}` (expected round, floor or ceil)")),
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let generator = &mut self.generator;
        if let Some(seed) = args.seed {
            generator.seed = Some(seed);
        }
        if let Some(w) = args.width {
            generator.heightfield.grid_size[0] = w;
        }
        if let Some(h) = args.height {
            generator.heightfield.grid_size[1] = h;
        }
        if let Some(max) = args.max_height {
            generator.heightfield.max_height = max;
        }
        if let Some(iterations) = args.smooth_iterations {
            generator.smooth_iterations = iterations;
            generator.do_heightfield_smoothing = iterations > 0;
        }
        if let Some(mode) = args.stepping {
            generator.stepping_mode = mode;
        }
        if let Some(ratio) = args.ramp_ratio {
            generator.ramp_ratio = ratio;
        }
        if let Some(subdivision) = args.floor_subdivision {
            generator.floor.subdivision = subdivision;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(verbosity) = args.verbosity {
            self.debug.verbosity = verbosity;
        }
        if let Some(ref dir) = args.output {
            self.output.directory = dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(42),
            width: Some(5),
            stepping: Some(SteppingMode::Floor),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.generator.seed, Some(42));
        assert_eq!(config.generator.heightfield.grid_size, [5, 25]);
        assert_eq!(config.generator.stepping_mode, SteppingMode::Floor);
        // Non-overridden fields retain defaults
        assert_eq!(config.generator.heightfield.max_height, 3);
        assert_eq!(config.debug.verbosity, 5);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_zero_smooth_iterations_disables_smoothing() {
        let mut config = Config::default();
        let args = CliArgs {
            smooth_iterations: Some(0),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert!(!config.generator.do_heightfield_smoothing);
    }

    #[test]
    fn test_parse_args() {
        let args = CliArgs::try_parse_from([
            "atoll",
            "--seed",
            "7",
            "--stepping",
            "CEIL",
            "--auto",
            "3",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.stepping, Some(SteppingMode::Ceil));
        assert_eq!(args.auto, Some(3));
        assert!(!args.new_seed);
    }

    #[test]
    fn test_unknown_stepping_mode_rejected() {
        assert!(CliArgs::try_parse_from(["atoll", "--stepping", "up"]).is_err());
    }
}
