//! Continuous heightfield synthesis, smoothing and terrace stepping.
//!
//! Each stage takes the previous grid by reference and returns a new owned
//! grid, so the pipeline composes as plain value transformations.

use atoll_config::{HeightfieldSettings, SteppingMode};
use glam::Vec2;
use noise::{NoiseFn, Perlin};

use crate::grid::Grid;
use crate::random_batch::RandomBatch;

/// Range of each component of the heightfield noise offset.
pub const HEIGHTFIELD_OFFSET_RANGE: f32 = 32767.0;

/// Perlin noise remapped from `[-1, 1]` into `[0, 1]`.
#[derive(Clone, Debug)]
pub struct UnitNoise {
    perlin: Perlin,
}

impl UnitNoise {
    /// Noise with the default permutation table. Variation between runs
    /// comes from the sampling offset, not the table.
    pub fn new() -> Self {
        Self {
            perlin: Perlin::new(Perlin::DEFAULT_SEED),
        }
    }

    /// Sample at `(x, y)`, clamped into `[0, 1]`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let raw = self.perlin.get([f64::from(x), f64::from(y)]) as f32;
        (raw * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

impl Default for UnitNoise {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw the heightfield noise offset. Consumes two draws.
pub fn draw_heightfield_offset(batch: &mut RandomBatch) -> Vec2 {
    let x = batch.next_f() * HEIGHTFIELD_OFFSET_RANGE;
    let y = batch.next_f() * HEIGHTFIELD_OFFSET_RANGE;
    Vec2::new(x, y)
}

/// Radial falloff of cell `(x, y)` towards the grid centre.
///
/// The centre is `(width / 2, height / 2)` in cell units and the reference
/// distance is `radius` times the centre's distance from the origin. A
/// non-positive reference distance contributes no radial term.
pub fn radial_falloff(settings: &HeightfieldSettings, x: usize, y: usize) -> f32 {
    let center = Vec2::new(
        settings.width() as f32 / 2.0,
        settings.height() as f32 / 2.0,
    );
    let max_distance = settings.radius * center.length();
    let radial = if max_distance > 0.0 {
        let distance = Vec2::new(x as f32, y as f32).distance(center);
        (1.0 - distance / max_distance).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (settings.radius_offset + radial) * settings.radius_weight
}

/// Build the continuous heightfield: unit noise times radial falloff.
pub fn generate_heightfield(settings: &HeightfieldSettings, offset: Vec2) -> Grid<f32> {
    let (width, height) = (settings.width(), settings.height());
    let [scale_x, scale_y] = settings.noise_scale;
    let noise = UnitNoise::new();

    Grid::from_fn(width, height, |x, y| {
        let sample_x = x as f32 / width as f32 * scale_x + offset.x;
        let sample_y = y as f32 / height as f32 * scale_y + offset.y;
        noise.sample(sample_x, sample_y) * radial_falloff(settings, x, y)
    })
}

const NEIGHBOURS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Box-filter the heightfield `iterations` times.
///
/// Each cell becomes the mean of itself and its in-bounds axis neighbours.
/// A pass reads only the grid as it was before the pass. A NaN result is
/// reported and kept.
pub fn smooth_heightfield(grid: &Grid<f32>, iterations: u32) -> Grid<f32> {
    let mut current = grid.clone();
    for _ in 0..iterations {
        current = smooth_pass(&current);
    }
    current
}

fn smooth_pass(source: &Grid<f32>) -> Grid<f32> {
    let (width, height) = source.dimensions();
    Grid::from_fn(width, height, |x, y| {
        let (xi, yi) = (x as i64, y as i64);
        let mut sum = source[(x, y)];
        let mut count = 1.0;
        for (dx, dy) in NEIGHBOURS {
            if let Some(v) = source.get(xi + dx, yi + dy) {
                sum += *v;
                count += 1.0;
            }
        }
        let value = sum / count;

        if value.is_nan() {
            let neighbours: Vec<Option<f32>> = NEIGHBOURS
                .iter()
                .map(|(dx, dy)| source.get(xi + dx, yi + dy).copied())
                .collect();
            tracing::error!(
                x,
                y,
                center = source[(x, y)],
                ?neighbours,
                "smoothing produced NaN"
            );
        }
        value
    })
}

/// Quantize one continuous height onto a terrace level.
pub fn step_value(value: f32, max_height: u32, mode: SteppingMode) -> u32 {
    let t = value.clamp(0.0, 1.0);
    let level = t * max_height as f32;
    let snapped = match mode {
        SteppingMode::Round => level.round_ties_even(),
        SteppingMode::Floor => level.floor(),
        SteppingMode::Ceil => level.ceil(),
    };
    // NaN saturates to 0 (void).
    snapped as u32
}

/// Quantize the whole heightfield onto terrace levels `0..=max_height`.
pub fn step_heightfield(grid: &Grid<f32>, max_height: u32, mode: SteppingMode) -> Grid<u32> {
    grid.map(|v| step_value(*v, max_height, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(width: u32, height: u32) -> HeightfieldSettings {
        HeightfieldSettings {
            grid_size: [width, height],
            radius: 1.0,
            radius_offset: 0.0,
            radius_weight: 1.0,
            max_height: 2,
            noise_scale: [1.0, 1.0],
        }
    }

    fn scrambled_grid(seed: u32, width: usize, height: usize) -> Grid<f32> {
        let mut batch = RandomBatch::new(seed, 97, 0, 1 << 20);
        Grid::from_fn(width, height, |_, _| batch.next_f() * 4.0)
    }

    #[test]
    fn test_unit_noise_in_range() {
        let noise = UnitNoise::new();
        for i in 0..200 {
            let v = noise.sample(i as f32 * 0.37, i as f32 * 0.11 + 5.0);
            assert!((0.0..=1.0).contains(&v), "noise out of range: {v}");
        }
    }

    #[test]
    fn test_generate_is_deterministic_for_offset() {
        let s = settings(8, 6);
        let offset = Vec2::new(123.5, 77.25);
        assert_eq!(generate_heightfield(&s, offset), generate_heightfield(&s, offset));
    }

    #[test]
    fn test_generate_bounded_by_weight() {
        let mut s = settings(12, 12);
        s.radius_weight = 2.0;
        let grid = generate_heightfield(&s, Vec2::new(10.0, 20.0));
        assert_eq!(grid.dimensions(), (12, 12));
        assert!(grid.iter().all(|(_, _, v)| (0.0..=2.0).contains(v)));
    }

    #[test]
    fn test_origin_corner_lies_on_the_falloff_boundary() {
        // The origin is exactly one centre-magnitude away from the centre.
        let s = settings(5, 5);
        assert_eq!(radial_falloff(&s, 0, 0), 0.0);
        assert!(radial_falloff(&s, 2, 2) > 0.75);
    }

    #[test]
    fn test_zero_radius_has_no_radial_term() {
        let mut s = settings(5, 5);
        s.radius = 0.0;
        let grid = generate_heightfield(&s, Vec2::ZERO);
        assert!(grid.iter().all(|(_, _, v)| *v == 0.0));
    }

    #[test]
    fn test_radius_offset_raises_falloff() {
        let mut s = settings(5, 5);
        s.radius_offset = 0.5;
        s.radius_weight = 2.0;
        assert_eq!(radial_falloff(&s, 0, 0), 1.0);
    }

    #[test]
    fn test_smoothing_is_non_expansive() {
        for seed in 1..20 {
            let before = scrambled_grid(seed, 7, 5);
            let after = smooth_heightfield(&before, 1);
            for (x, y, v) in after.iter() {
                let mut lo = before[(x, y)];
                let mut hi = lo;
                for (dx, dy) in NEIGHBOURS {
                    if let Some(n) = before.get(x as i64 + dx, y as i64 + dy) {
                        lo = lo.min(*n);
                        hi = hi.max(*n);
                    }
                }
                assert!(
                    *v >= lo - 1e-6 && *v <= hi + 1e-6,
                    "cell ({x}, {y}) = {v} escaped [{lo}, {hi}]"
                );
            }
        }
    }

    #[test]
    fn test_smoothing_uses_shrinking_divisor() {
        let mut grid = Grid::filled(3, 3, 0.0f32);
        grid[(0, 0)] = 3.0;
        let smoothed = smooth_heightfield(&grid, 1);
        // Corner: self + 2 neighbours.
        assert!((smoothed[(0, 0)] - 1.0).abs() < 1e-6);
        // Edge: self + 3 neighbours, one of them the spike.
        assert!((smoothed[(1, 0)] - 0.75).abs() < 1e-6);
        assert_eq!(smoothed[(2, 2)], 0.0);
    }

    #[test]
    fn test_smoothing_zero_iterations_is_identity() {
        let grid = scrambled_grid(5, 4, 4);
        assert_eq!(smooth_heightfield(&grid, 0), grid);
    }

    #[test]
    fn test_smoothing_keeps_nan() {
        let mut grid = Grid::filled(3, 1, 1.0f32);
        grid[(1, 0)] = f32::NAN;
        let smoothed = smooth_heightfield(&grid, 1);
        assert!(smoothed[(1, 0)].is_nan());
        assert!(smoothed[(0, 0)].is_nan());
    }

    #[test]
    fn test_stepping_is_monotonic_in_all_modes() {
        for mode in [SteppingMode::Round, SteppingMode::Floor, SteppingMode::Ceil] {
            for max_height in [1, 2, 3, 7] {
                let mut previous = 0;
                for i in -10..=1010 {
                    let level = step_value(i as f32 / 1000.0, max_height, mode);
                    assert!(level >= previous, "{mode:?} not monotonic at {i}");
                    assert!(level <= max_height);
                    previous = level;
                }
            }
        }
    }

    #[test]
    fn test_round_mode_ties_to_even() {
        assert_eq!(step_value(0.25, 2, SteppingMode::Round), 0);
        assert_eq!(step_value(0.75, 2, SteppingMode::Round), 2);
        assert_eq!(step_value(0.25, 2, SteppingMode::Floor), 0);
        assert_eq!(step_value(0.25, 2, SteppingMode::Ceil), 1);
    }

    #[test]
    fn test_stepping_clamps_out_of_range_values() {
        assert_eq!(step_value(1.8, 3, SteppingMode::Round), 3);
        assert_eq!(step_value(-0.4, 3, SteppingMode::Ceil), 0);
        assert_eq!(step_value(f32::NAN, 3, SteppingMode::Round), 0);
    }

    #[test]
    fn test_small_island_reproduces_bit_for_bit() {
        let s = settings(5, 5);
        let run = |seed| {
            let mut batch = RandomBatch::for_run(seed);
            let offset = draw_heightfield_offset(&mut batch);
            let continuous = generate_heightfield(&s, offset);
            step_heightfield(&continuous, s.max_height, SteppingMode::Round)
        };
        let first = run(42);
        assert_eq!(first, run(42));
        assert_eq!(first[(0, 0)], 0, "origin corner lies outside the island");
        assert!(first.iter().all(|(_, _, level)| *level <= 2));
    }
}
