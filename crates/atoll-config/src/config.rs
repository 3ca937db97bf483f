//! Top-level configuration with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::generator::GeneratorSettings;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Island generation settings.
    pub generator: GeneratorSettings,
    /// Debug/diagnostic settings.
    pub debug: DebugConfig,
    /// Artifact output settings.
    pub output: OutputConfig,
}

/// Debug/diagnostic configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Diagnostics tagged with a priority above this are suppressed.
    pub verbosity: u8,
    /// Dump intermediate grids to the log.
    pub print_output: bool,
}

/// Where and what to write after a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory for generated artifacts.
    pub directory: PathBuf,
    /// Greyscale image of the stepped heightfield.
    pub heightfield_png: bool,
    /// Greyscale image of the continuous heightfield under the floor.
    pub floor_preview_png: bool,
    /// Floor mesh as a Wavefront OBJ file.
    pub floor_obj: bool,
    /// JSON summary of the run.
    pub summary_json: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            verbosity: 5,
            print_output: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./output"),
            heightfield_png: true,
            floor_preview_png: true,
            floor_obj: true,
            summary_json: true,
        }
    }
}

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
    let config: Config = ron::from_str(&text).map_err(ConfigError::ParseError)?;
    config.generator.validate()?;
    Ok(config)
}

impl Config {
    /// Read `config.ron` from `config_dir`. A missing file is replaced by the
    /// defaults, which are written back so the user has something to edit.
    ///
    /// Generator settings are validated, so a file that parses but describes
    /// an impossible island is rejected here rather than mid-run.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Self::default();
            config.save(config_dir)?;
            log::info!("Wrote default island config to {}", path.display());
            return Ok(config);
        }

        let config = read_config(&path)?;
        log::info!(
            "Island config loaded from {} (seed {:?}, grid {:?})",
            path.display(),
            config.generator.seed,
            config.generator.heightfield.grid_size
        );
        Ok(config)
    }

    /// Write `config.ron` into `config_dir`, creating the directory first.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        // Depth 4 keeps flora entries on one line each.
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;
        std::fs::write(config_dir.join(CONFIG_FILE), text).map_err(ConfigError::WriteError)
    }

    /// Read the file again and return it only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = read_config(&config_dir.join(CONFIG_FILE))?;
        if fresh == *self {
            return Ok(None);
        }
        if fresh.generator != self.generator {
            log::info!("Generator settings changed on disk");
        }
        Ok(Some(fresh))
    }
}
