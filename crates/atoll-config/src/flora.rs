//! Decoration catalogue: rocks, trees and grass with their spacing radii and weights.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One placeable decoration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FloraEntry {
    /// Reference handed to the decoration service (prefab or asset name).
    pub prefab: String,
    /// Spacing radius: candidates closer than this to a placed instance are dropped.
    pub radius: f32,
}

impl FloraEntry {
    /// Convenience constructor.
    pub fn new(prefab: impl Into<String>, radius: f32) -> Self {
        Self {
            prefab: prefab.into(),
            radius,
        }
    }
}

/// Weighted decoration catalogue.
///
/// Weights are relative to each other: with the defaults a rock is picked
/// roughly 1 time in 111 and grass roughly 100 times in 111.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FloraSet {
    /// Scales the number of surface candidates per tile (0.0 - 1.0).
    pub density: f32,
    /// Relative weight of the rock category.
    pub rock_weight: u32,
    /// Relative weight of the tree category.
    pub tree_weight: u32,
    /// Relative weight of the grass category.
    pub grass_weight: u32,
    /// Rocks. Also used for the floor border.
    pub rocks: Vec<FloraEntry>,
    /// Trees.
    pub trees: Vec<FloraEntry>,
    /// Grass and small plants.
    pub grass: Vec<FloraEntry>,
}

impl Default for FloraSet {
    fn default() -> Self {
        Self {
            density: 1.0,
            rock_weight: 1,
            tree_weight: 10,
            grass_weight: 100,
            rocks: vec![
                FloraEntry::new("rock_small", 1.0),
                FloraEntry::new("rock_large", 2.0),
            ],
            trees: vec![
                FloraEntry::new("tree_pine", 1.5),
                FloraEntry::new("tree_oak", 2.0),
            ],
            grass: vec![
                FloraEntry::new("grass_tuft", 0.5),
                FloraEntry::new("grass_patch", 0.75),
            ],
        }
    }
}

impl FloraSet {
    /// Sum of the three category weights, saturating at `u32::MAX`.
    pub fn total_weight(&self) -> u32 {
        self.rock_weight
            .saturating_add(self.tree_weight)
            .saturating_add(self.grass_weight)
    }

    /// Check weights, density and radii.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.density.is_finite() && self.density >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "floraset.density",
                reason: format!("{} must be finite and non-negative", self.density),
            });
        }
        let exact = self
            .rock_weight
            .checked_add(self.tree_weight)
            .and_then(|w| w.checked_add(self.grass_weight));
        if exact.is_none() {
            return Err(ConfigError::Invalid {
                field: "floraset.weights",
                reason: "category weights add up past u32::MAX".to_string(),
            });
        }
        if self.total_weight() == 0 {
            return Err(ConfigError::Invalid {
                field: "floraset.weights",
                reason: "at least one category weight must be positive".to_string(),
            });
        }
        let entries = self.rocks.iter().chain(&self.trees).chain(&self.grass);
        for entry in entries {
            if !entry.radius.is_finite() {
                return Err(ConfigError::Invalid {
                    field: "floraset.radius",
                    reason: format!("entry `{}` has radius {}", entry.prefab, entry.radius),
                });
            }
        }
        Ok(())
    }
}
