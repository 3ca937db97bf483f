//! Renderers for heightfield diagnostics.

use super::image::DebugImage;
use crate::grid::Grid;

/// Grey value for terrace `level` out of `max_height`.
pub fn level_to_grey(level: u32, max_height: u32) -> u8 {
    if max_height == 0 {
        return 0;
    }
    let t = (level as f32 / max_height as f32).clamp(0.0, 1.0);
    (t * 255.0).round() as u8
}

/// One opaque pixel per cell, intensity `level / max_height`. Pixel row is
/// the grid's `y`.
pub fn render_stepped_heightfield(grid: &Grid<u32>, max_height: u32) -> DebugImage {
    let mut image = DebugImage::new(grid.width() as u32, grid.height() as u32);
    for (x, y, level) in grid.iter() {
        image.set_grey(x as u32, y as u32, level_to_grey(*level, max_height));
    }
    image
}

/// One pixel per subdivided floor cell. Land cells show the continuous
/// height of their owning tile; void stays transparent.
pub fn render_floor_preview(
    continuous: &Grid<f32>,
    stepped: &Grid<u32>,
    subdivision: u32,
) -> DebugImage {
    let sub = subdivision.max(1);
    let mut image = DebugImage::new(stepped.width() as u32 * sub, stepped.height() as u32 * sub);

    for (x, y, level) in stepped.iter() {
        if *level == 0 {
            continue;
        }
        let value = (continuous[(x, y)].clamp(0.0, 1.0) * 255.0).round() as u8;
        for i in 0..sub {
            for j in 0..sub {
                image.set_grey(x as u32 * sub + i, y as u32 * sub + j, value);
            }
        }
    }
    image
}
