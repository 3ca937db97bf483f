//! Diagnostic images of generation data.
//!
//! Provides [`DebugImage`] and renderers for the stepped heightfield and the
//! floor preview. These are written next to a run's other artifacts for
//! offline inspection and are never read back by the pipeline.

mod image;
mod renderers;

pub use self::image::{DebugImage, ImageError};
pub use renderers::{level_to_grey, render_floor_preview, render_stepped_heightfield};
