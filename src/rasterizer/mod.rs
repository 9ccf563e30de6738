//! CPU software rasterizer for lit cubes
//!
//! Per frame, for each cube:
//! model matrix -> world vertices -> per triangle: face normal,
//! back-face cull, clip-space triangle, Sutherland-Hodgman clip,
//! perspective divide + viewport, barycentric fill with depth test.
//!
//! Features:
//! - Two-formulation projection (five chained stages or one matrix)
//! - Homogeneous clipping against the six frustum planes
//! - Z-buffer where smaller depth is nearer
//! - Flat or per-pixel Blinn-Phong shading

mod camera;
mod clip;
mod math;
mod pipeline;
mod render;
mod shading;
mod types;

pub use camera::*;
pub use clip::*;
pub use math::*;
pub use pipeline::*;
pub use render::*;
pub use shading::*;
pub use types::*;
