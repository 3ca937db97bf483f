//! Island terrain: seeded randomness, heightfield synthesis, ramp marking,
//! marching-squares tile resolution, and decoration placement.

mod grid;
mod heightfield;
mod random_batch;
mod ramp;
mod tile;

pub mod debug_viz;
pub mod flora;

pub use flora::{Placement, SurfaceVolume};
pub use grid::Grid;
pub use heightfield::{
    HEIGHTFIELD_OFFSET_RANGE, UnitNoise, draw_heightfield_offset, generate_heightfield,
    radial_falloff, smooth_heightfield, step_heightfield, step_value,
};
pub use random_batch::{DEFAULT_CAPACITY, DEFAULT_MAX_VALUE, RandomBatch, seed_from_clock};
pub use ramp::{RampSpot, RampSpots, find_ramp_candidates, mark_ramps, select_ramps};
pub use tile::{
    Neighbourhood, Resolution, Rotation, Template, TemplateAudit, TileKind, TileLayout,
    audit_templates, match_neighbourhood, resolve_layout, resolve_tile, rotate_neighbourhood,
    sample_neighbourhood, template_matches,
};
