//! Cube Raster: CPU software rasterizer for lit cube scenes
//!
//! - Classical A..P viewing/projection chain and screen mapping
//! - Sutherland-Hodgman clipping in homogeneous clip space
//! - Z-buffered barycentric rasterization
//! - Flat or per-pixel Blinn-Phong shading with point lights
//! - RON scene files, PPM/PNG export

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rasterizer;
pub mod world;
