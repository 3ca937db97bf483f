//! Floor mesh data: quad-topology positions, UVs and 32-bit indices.

use std::io::{self, Write};

use glam::{Vec2, Vec3};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Skirt mesh beneath the island.
///
/// Every quad owns four consecutive vertices, so `indices` is always a
/// multiple of four. Positions are floor-local; `offset` places the mesh in
/// the world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FloorMesh {
    /// Vertex positions in the floor-local frame.
    pub positions: Vec<Vec3>,
    /// One UV per vertex, normalized over the whole subdivided grid.
    pub uvs: Vec<Vec2>,
    /// Quad indices, four per quad.
    pub indices: Vec<u32>,
    /// World offset of the floor-local frame.
    pub offset: Vec3,
}

impl FloorMesh {
    pub fn new(offset: Vec3) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    /// Append one quad; corners in `tl, tr, br, bl` order.
    pub fn push_quad(&mut self, corners: [Vec3; 4], uvs: [Vec2; 4]) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&corners);
        self.uvs.extend_from_slice(&uvs);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 3]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn quad_count(&self) -> usize {
        self.indices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Split every quad `(a, b, c, d)` into triangles `(a, b, c)` and
    /// `(a, c, d)`.
    pub fn triangulated_indices(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.quad_count() * 6);
        for quad in self.indices.chunks_exact(4) {
            let [a, b, c, d] = [quad[0], quad[1], quad[2], quad[3]];
            out.extend_from_slice(&[a, b, c, a, c, d]);
        }
        out
    }

    /// Area-weighted vertex normals over the triangulated mesh.
    ///
    /// Vertices not referenced by any triangle, or only by degenerate ones,
    /// get a zero normal.
    pub fn compute_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.triangulated_indices().chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        normals.iter().map(|n| n.normalize_or_zero()).collect()
    }

    /// Bounds in the floor-local frame, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Aabb { min, max })
    }

    /// Write the mesh as Wavefront OBJ with quad faces, positions shifted
    /// by `offset`. Normals come from [`Self::compute_normals`].
    pub fn write_obj<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "# atoll floor: {} quads", self.quad_count())?;
        writeln!(out, "o floor")?;
        for p in &self.positions {
            let w = *p + self.offset;
            writeln!(out, "v {} {} {}", w.x, w.y, w.z)?;
        }
        for uv in &self.uvs {
            writeln!(out, "vt {} {}", uv.x, uv.y)?;
        }
        for n in self.compute_normals() {
            writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
        }
        for quad in self.indices.chunks_exact(4) {
            write!(out, "f")?;
            for index in quad {
                let i = index + 1;
                write!(out, " {i}/{i}/{i}")?;
            }
            writeln!(out)?;
        }
        out.flush()
    }
}
