//! Ramp marking on the stepped heightfield.
//!
//! A ramp sits on a straight terrace edge: two opposite neighbours share the
//! cell's level, one perpendicular neighbour continues the terrace, and the
//! other is lower but still land.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::random_batch::RandomBatch;
use crate::tile::Rotation;

/// A cell that renders as a ramp facing `rotation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RampSpot {
    pub x: usize,
    pub y: usize,
    pub rotation: Rotation,
}

impl RampSpot {
    pub const fn new(x: usize, y: usize, rotation: Rotation) -> Self {
        Self { x, y, rotation }
    }
}

/// Kept ramp spots in selection order, with lookup by cell.
#[derive(Clone, Debug, Default)]
pub struct RampSpots {
    spots: Vec<RampSpot>,
    by_cell: HashMap<(usize, usize), Rotation>,
}

impl RampSpots {
    /// Collect spots; a later spot on an already marked cell is ignored.
    pub fn from_spots(spots: impl IntoIterator<Item = RampSpot>) -> Self {
        let mut out = Self::default();
        for spot in spots {
            out.push(spot);
        }
        out
    }

    fn push(&mut self, spot: RampSpot) {
        if self.by_cell.contains_key(&(spot.x, spot.y)) {
            return;
        }
        self.by_cell.insert((spot.x, spot.y), spot.rotation);
        self.spots.push(spot);
    }

    /// Rotation of the ramp at `(x, y)`, if the cell is marked.
    pub fn get(&self, x: usize, y: usize) -> Option<Rotation> {
        self.by_cell.get(&(x, y)).copied()
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RampSpot> {
        self.spots.iter()
    }

    pub fn as_slice(&self) -> &[RampSpot] {
        &self.spots
    }
}

/// Whether `neighbour` is a walkable step down from level `c`.
fn steps_down(neighbour: u32, c: u32) -> bool {
    neighbour > 0 && neighbour < c
}

/// Scan interior land cells for ramp candidates, `x`-major.
///
/// Rotation 0 steps down towards `y - 1`, 1 towards `x + 1`, 2 towards
/// `y + 1` and 3 towards `x - 1`.
pub fn find_ramp_candidates(grid: &Grid<u32>) -> Vec<RampSpot> {
    let (width, height) = grid.dimensions();
    let mut candidates = Vec::new();

    for x in 1..width.saturating_sub(1) {
        for y in 1..height.saturating_sub(1) {
            let c = grid[(x, y)];
            if c == 0 {
                continue;
            }
            let left = grid[(x - 1, y)];
            let right = grid[(x + 1, y)];
            let down = grid[(x, y - 1)];
            let up = grid[(x, y + 1)];

            let rotation = if left == c && right == c {
                if up == c && steps_down(down, c) {
                    Some(0)
                } else if down == c && steps_down(up, c) {
                    Some(2)
                } else {
                    None
                }
            } else if down == c && up == c {
                if left == c && steps_down(right, c) {
                    Some(1)
                } else if right == c && steps_down(left, c) {
                    Some(3)
                } else {
                    None
                }
            } else {
                None
            };

            if let Some(turns) = rotation {
                candidates.push(RampSpot::new(x, y, Rotation::new(turns)));
            }
        }
    }
    candidates
}

/// Thin out candidates.
///
/// The first candidate of each rotation is always kept. Every later one
/// draws from the batch and survives when the draw is below `ratio`.
pub fn select_ramps(candidates: &[RampSpot], ratio: f32, batch: &mut RandomBatch) -> RampSpots {
    let mut represented = [false; 4];
    let mut kept = RampSpots::default();

    for spot in candidates {
        let group = spot.rotation.index();
        if !represented[group] {
            represented[group] = true;
            kept.push(*spot);
        } else if batch.next_f() < ratio {
            kept.push(*spot);
        }
    }
    kept
}

/// Find and select ramp spots in one step.
pub fn mark_ramps(grid: &Grid<u32>, ratio: f32, batch: &mut RandomBatch) -> RampSpots {
    let candidates = find_ramp_candidates(grid);
    let kept = select_ramps(&candidates, ratio, batch);
    tracing::debug!(
        candidates = candidates.len(),
        kept = kept.len(),
        "marked ramp spots"
    );
    kept
}
