//! Per-run generator settings: heightfield, smoothing, ramps, tiles, floor and flora.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flora::FloraSet;

/// How a continuous height is snapped onto an integer terrace level.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SteppingMode {
    /// Nearest level, ties to even.
    #[default]
    Round,
    /// Next level down.
    Floor,
    /// Next level up.
    Ceil,
}

/// Shape of the continuous heightfield.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeightfieldSettings {
    /// Grid size in tiles, `[width, height]`.
    pub grid_size: [u32; 2],
    /// Island radius as a fraction of the grid's half-diagonal (0.0 - 1.0).
    pub radius: f32,
    /// Added to the radial falloff before weighting.
    pub radius_offset: f32,
    /// Multiplier on the radial falloff.
    pub radius_weight: f32,
    /// Highest terrace level.
    pub max_height: u32,
    /// Noise frequency along x and y over the whole grid.
    pub noise_scale: [f32; 2],
}

impl Default for HeightfieldSettings {
    fn default() -> Self {
        Self {
            grid_size: [25, 25],
            radius: 0.75,
            radius_offset: 0.0,
            radius_weight: 2.0,
            max_height: 3,
            noise_scale: [3.0, 3.0],
        }
    }
}

impl HeightfieldSettings {
    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.grid_size[0] as usize
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.grid_size[1] as usize
    }
}

/// Shaping of the skirt mesh generated beneath the island.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FloorSettings {
    /// Quads per cell edge. 1 means no subdivision; cost grows quadratically.
    pub subdivision: u32,
    /// Weight of the continuous heightfield on the floor depth.
    pub heightfield_multiplier: f32,
    /// Weight of the floor noise on the floor depth.
    pub noise_multiplier: f32,
    /// Frequency of the floor noise over the normalized floor.
    pub noise_scale: f32,
    /// Weight of the radial term on the floor depth.
    pub distance_multiplier: f32,
    /// Exponent applied to the radial term.
    pub distance_exponent: f32,
    /// Height that border vertices are pinned to.
    pub edge_height: f32,
}

impl Default for FloorSettings {
    fn default() -> Self {
        Self {
            subdivision: 4,
            heightfield_multiplier: 0.0,
            noise_multiplier: 2.0,
            noise_scale: 10.0,
            distance_multiplier: 10.0,
            distance_exponent: 10.0,
            edge_height: 0.0,
        }
    }
}

/// Immutable configuration snapshot for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Fixed seed. `None` (or 0) lets the generator pick one from the clock.
    pub seed: Option<u32>,

    /// Heightfield shape.
    pub heightfield: HeightfieldSettings,

    /// Run the averaging filter before stepping.
    pub do_heightfield_smoothing: bool,
    /// Rounding used when stepping. Floor tends to look best.
    pub stepping_mode: SteppingMode,
    /// Smoothing passes. More than 3 erodes a lot of detail.
    pub smooth_iterations: u32,

    /// Mark ramps between terrace levels.
    pub do_ramp_generation: bool,
    /// Share of the surplus ramp candidates that are kept (0.0 - 1.0).
    pub ramp_ratio: f32,

    /// Hand the resolved layout to the tile service.
    pub do_tile_generation: bool,
    /// World size of one tile along x, y and z.
    pub tile_scale: [f32; 3],

    /// Build the skirt mesh under the island.
    pub do_floor_generation: bool,
    /// Decorate the floor border with rocks.
    pub do_floor_border_generation: bool,
    /// Skirt mesh shaping.
    pub floor: FloorSettings,

    /// Scatter flora over tile surfaces.
    pub do_beautification: bool,
    /// Decoration catalogue used for border rocks and flora.
    pub floraset: Option<FloraSet>,

    /// Ask the host to bake a navigation mesh after generation.
    pub do_navmesh_generation: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            seed: None,
            heightfield: HeightfieldSettings::default(),
            do_heightfield_smoothing: true,
            stepping_mode: SteppingMode::Round,
            smooth_iterations: 1,
            do_ramp_generation: true,
            ramp_ratio: 0.1,
            do_tile_generation: true,
            tile_scale: [4.0, 4.0, 4.0],
            do_floor_generation: true,
            do_floor_border_generation: true,
            floor: FloorSettings::default(),
            do_beautification: true,
            floraset: Some(FloraSet::default()),
            do_navmesh_generation: true,
        }
    }
}

impl GeneratorSettings {
    /// Copy of these settings for rapid automatic regeneration.
    ///
    /// Navmesh baking is forced off; every other field is unchanged.
    pub fn for_auto_regeneration(&self) -> Self {
        Self {
            do_navmesh_generation: false,
            ..self.clone()
        }
    }

    /// Check the settings for values no stage can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let hf = &self.heightfield;
        if hf.grid_size[0] == 0 || hf.grid_size[1] == 0 {
            return Err(ConfigError::Invalid {
                field: "heightfield.grid_size",
                reason: format!("{:?} has a zero dimension", hf.grid_size),
            });
        }
        if !(hf.radius.is_finite() && hf.radius_offset.is_finite() && hf.radius_weight.is_finite())
        {
            return Err(ConfigError::Invalid {
                field: "heightfield.radius",
                reason: "radius, offset and weight must be finite".to_string(),
            });
        }
        if !hf.noise_scale.iter().all(|s| s.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "heightfield.noise_scale",
                reason: format!("{:?} is not finite", hf.noise_scale),
            });
        }
        if !(0.0..=1.0).contains(&self.ramp_ratio) {
            return Err(ConfigError::Invalid {
                field: "ramp_ratio",
                reason: format!("{} is outside 0..=1", self.ramp_ratio),
            });
        }
        if !self.tile_scale.iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err(ConfigError::Invalid {
                field: "tile_scale",
                reason: format!("{:?} must be finite and positive", self.tile_scale),
            });
        }
        if self.floor.subdivision == 0 {
            return Err(ConfigError::Invalid {
                field: "floor.subdivision",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(floraset) = &self.floraset {
            floraset.validate()?;
        }
        Ok(())
    }
}
