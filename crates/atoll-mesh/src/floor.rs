//! Floor skirt construction.
//!
//! Every land cell is split into `subdivision²` quads hanging below the
//! island. Vertex depth is the product of a heightfield, a noise and a
//! radial modifier; vertices on the island boundary are pinned to the edge
//! height so the skirt meets the tile walls without gaps.

use atoll_config::FloorSettings;
use atoll_terrain::{Grid, RandomBatch, UnitNoise};
use glam::{Vec2, Vec3};
use hashbrown::HashSet;

use crate::edges::{QuadCorner, Side, corner_at, on_side};
use crate::floor_mesh::FloorMesh;

/// Range of each component of the floor noise offset.
pub const FLOOR_NOISE_OFFSET_RANGE: f32 = 1000.0;

/// Draw the floor noise offset. Consumes two draws.
pub fn draw_floor_noise_offset(batch: &mut RandomBatch) -> Vec2 {
    let x = batch.next_f() * FLOOR_NOISE_OFFSET_RANGE;
    let y = batch.next_f() * FLOOR_NOISE_OFFSET_RANGE;
    Vec2::new(x, y)
}

/// Result of a floor build.
#[derive(Clone, Debug, Default)]
pub struct FloorOutput {
    pub mesh: FloorMesh,
    /// Pinned boundary vertices in the floor-local frame, first occurrence
    /// order, no duplicates.
    pub border: Vec<Vec3>,
}

/// Ordered set of border points keyed on their bit patterns.
#[derive(Default)]
struct BorderPoints {
    seen: HashSet<[u32; 3]>,
    points: Vec<Vec3>,
}

impl BorderPoints {
    fn insert(&mut self, point: Vec3) {
        // +0.0 folds -0.0 onto 0.0
        let p = point + Vec3::ZERO;
        if self.seen.insert([p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]) {
            self.points.push(p);
        }
    }
}

/// Replace an exactly zero modifier with a neutral one.
fn neutral(modifier: f32) -> f32 {
    if modifier == 0.0 { 1.0 } else { modifier }
}

/// Builds floor meshes for one run.
#[derive(Clone, Debug)]
pub struct FloorBuilder<'a> {
    settings: &'a FloorSettings,
    tile_scale: Vec3,
    noise_offset: Vec2,
    noise: UnitNoise,
}

impl<'a> FloorBuilder<'a> {
    pub fn new(settings: &'a FloorSettings, tile_scale: Vec3, noise_offset: Vec2) -> Self {
        Self {
            settings,
            tile_scale,
            noise_offset,
            noise: UnitNoise::new(),
        }
    }

    fn subdivision(&self) -> u32 {
        self.settings.subdivision.max(1)
    }

    /// Depth of an unpinned vertex at normalized floor position `uv`,
    /// below a cell whose continuous height is `cell_height`.
    pub fn floor_height(&self, cell_height: f32, uv: Vec2) -> f32 {
        let s = self.settings;

        let heightfield = neutral(cell_height * s.heightfield_multiplier);

        let at = (self.noise_offset + uv) * s.noise_scale;
        let noise = neutral(self.noise.sample(at.x, at.y) * s.noise_multiplier);

        let centre = uv - Vec2::splat(0.5);
        let falloff = 1.0 - libm::hypotf(centre.x, centre.y);
        let distance = neutral(libm::powf(falloff, s.distance_exponent) * s.distance_multiplier);

        -(heightfield * noise * distance)
    }

    /// Build the floor under every land cell of `stepped`.
    ///
    /// `continuous` supplies the per-cell height for the heightfield
    /// modifier and must have the same dimensions.
    pub fn build(&self, stepped: &Grid<u32>, continuous: &Grid<f32>) -> FloorOutput {
        let (width, height) = stepped.dimensions();
        let sub = self.subdivision();
        let step = self.tile_scale / sub as f32;
        let origin = Vec3::new(
            -(width as f32) * self.tile_scale.x / 2.0,
            0.0,
            -(height as f32) * self.tile_scale.z / 2.0,
        );
        let extent = Vec2::new((width as u32 * sub) as f32, (height as u32 * sub) as f32);

        let mut mesh = FloorMesh::new(Vec3::new(0.0, -self.tile_scale.y, 0.0));
        let mut border = BorderPoints::default();

        for i in 0..width {
            for j in 0..height {
                if stepped[(i, j)] == 0 {
                    continue;
                }
                let cell_height = continuous[(i, j)];

                for sx in 0..sub {
                    for sz in 0..sub {
                        let lx = i as u32 * sub + sx;
                        let lz = j as u32 * sub + sz;

                        let mut corners = [Vec3::ZERO; 4];
                        let mut uvs = [Vec2::ZERO; 4];
                        for corner in QuadCorner::ALL {
                            let (dx, dz) = corner.lattice_offset();
                            let (cx, cz) = ((lx + dx) as f32, (lz + dz) as f32);
                            let uv = Vec2::new(cx, cz) / extent;
                            let k = corner.index();
                            uvs[k] = uv;
                            corners[k] = Vec3::new(
                                origin.x + cx * step.x,
                                self.floor_height(cell_height, uv),
                                origin.z + cz * step.z,
                            );
                        }

                        for side in Side::ALL {
                            if on_side(stepped, i, j, sx, sz, sub, side) {
                                for corner in side.corners() {
                                    let v = &mut corners[corner.index()];
                                    v.y = self.settings.edge_height;
                                    border.insert(*v);
                                }
                            }
                        }
                        if let Some(corner) = corner_at(stepped, i, j, sx, sz, sub) {
                            let v = &mut corners[corner.index()];
                            v.y = self.settings.edge_height;
                            border.insert(*v);
                        }

                        mesh.push_quad(corners, uvs);
                    }
                }
            }
        }

        tracing::debug!(
            quads = mesh.quad_count(),
            border_points = border.points.len(),
            "built floor mesh"
        );
        FloorOutput {
            mesh,
            border: border.points,
        }
    }
}

/// Build the floor mesh in one call.
pub fn build_floor_mesh(
    stepped: &Grid<u32>,
    continuous: &Grid<f32>,
    settings: &FloorSettings,
    tile_scale: Vec3,
    noise_offset: Vec2,
) -> FloorOutput {
    FloorBuilder::new(settings, tile_scale, noise_offset).build(stepped, continuous)
}
