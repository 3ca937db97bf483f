//! Floor meshing: the subdivided skirt hanging beneath the island, its
//! boundary predicates, and the mesh container with export helpers.

pub mod edges;
pub mod floor;
pub mod floor_mesh;

pub use edges::{QuadCorner, Side, corner_at, on_side};
pub use floor::{
    FLOOR_NOISE_OFFSET_RANGE, FloorBuilder, FloorOutput, build_floor_mesh, draw_floor_noise_offset,
};
pub use floor_mesh::{Aabb, FloorMesh};
