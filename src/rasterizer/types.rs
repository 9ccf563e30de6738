//! Core types for the rasterizer

use serde::{Serialize, Deserialize};

use super::camera::Camera;
use super::math::{Mat4, Vec3};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Linear [0,1] RGB to 8-bit. Components are clamped, then truncated.
    pub fn from_linear(rgb: Vec3) -> Self {
        let c = rgb.clamp01();
        Self::new((c.x * 255.0) as u8, (c.y * 255.0) as u8, (c.z * 255.0) as u8)
    }

    /// Unpack 0xAARRGGBB
    pub fn from_argb(p: u32) -> Self {
        Self {
            a: (p >> 24) as u8,
            r: (p >> 16) as u8,
            g: (p >> 8) as u8,
            b: p as u8,
        }
    }

    /// Pack as 0xAARRGGBB
    pub fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Convert to [u8; 4] RGBA
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Pack a linear color with alpha fixed at 0xFF
pub fn pack_rgb(rgb: Vec3) -> u32 {
    Color::from_linear(rgb).to_argb()
}

fn default_shininess() -> f64 {
    32.0
}

/// Surface response to light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Base color, linear RGB in [0,1]
    pub color: Vec3,
    pub ka: f64,
    pub kd: f64,
    pub ks: f64,
    #[serde(default = "default_shininess")]
    pub shininess: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            ka: 0.1,
            kd: 0.8,
            ks: 0.5,
            shininess: 32.0,
        }
    }
}

/// Point light, no distance attenuation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f64,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

impl Light {
    pub fn new(position: Vec3, color: Vec3, intensity: f64) -> Self {
        Self { position, color, intensity }
    }
}

/// Unit cube corners, centred on the origin
pub const CUBE_VERTICES: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
];

/// 12 triangles, two per side; triangle `i` belongs to side `i / 2`
pub const CUBE_FACES: [[usize; 3]; 12] = [
    [4, 5, 6], [4, 6, 7], // front  (z = +0.5)
    [1, 0, 3], [1, 3, 2], // back   (z = -0.5)
    [5, 1, 2], [5, 2, 6], // right  (x = +0.5)
    [0, 4, 7], [0, 7, 3], // left   (x = -0.5)
    [7, 6, 2], [7, 2, 3], // top    (y = +0.5)
    [0, 1, 5], [0, 5, 4], // bottom (y = -0.5)
];

/// Outward normal of each side, indexed by `triangle / 2`
pub const CUBE_FACE_NORMALS: [Vec3; 6] = [
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(0.0, 0.0, -1.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(-1.0, 0.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(0.0, -1.0, 0.0),
];

/// A unit cube instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    /// Uniform scale
    pub scale: f64,
    pub material: Material,
}

impl Default for Cube {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
            material: Material::default(),
        }
    }
}

impl Cube {
    /// Object to world. Points are scaled, rotated about X, then Y, then Z,
    /// then translated.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::translation(self.position)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::scale(self.scale)
    }

    /// The 8 corners in world space
    pub fn world_vertices(&self) -> [Vec3; 8] {
        let model = self.model_matrix();
        CUBE_VERTICES.map(|v| model.transform_point(v))
    }
}

/// Everything drawn in one frame
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub camera: Camera,
    pub cubes: Vec<Cube>,
    pub lights: Vec<Light>,
}

/// Shading mode, chosen once per render call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadingMode {
    /// One lighting evaluation per triangle
    Flat,
    /// Blinn-Phong evaluated per pixel from interpolated normal and position
    #[default]
    Phong,
}

impl ShadingMode {
    pub fn toggled(self) -> Self {
        match self {
            ShadingMode::Flat => ShadingMode::Phong,
            ShadingMode::Phong => ShadingMode::Flat,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShadingMode::Flat => "flat",
            ShadingMode::Phong => "phong",
        }
    }
}

/// Background used by the render entry point
pub const DEFAULT_BACKGROUND: u32 = 0xFF1A_1A1A;

/// Per-call render settings
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub shading: ShadingMode,
    /// Packed 0xAARRGGBB clear color
    pub background: u32,
    /// Skip triangles facing away from the eye
    pub backface_cull: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shading: ShadingMode::Phong,
            background: DEFAULT_BACKGROUND,
            backface_cull: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_color_pack_roundtrip_and_clamp() {
        assert_eq!(pack_rgb(Vec3::new(1.0, 0.0, 0.0)), 0xFFFF_0000);
        assert_eq!(pack_rgb(Vec3::new(2.0, -1.0, 0.5)), 0xFFFF_007F);
        let c = Color::from_argb(0xFF12_3456);
        assert_eq!((c.r, c.g, c.b, c.a), (0x12, 0x34, 0x56, 0xFF));
        assert_eq!(c.to_argb(), 0xFF12_3456);
    }

    #[test]
    fn test_face_normals_match_topology() {
        // Each triangle's geometric normal agrees with its side's table normal
        for (i, f) in CUBE_FACES.iter().enumerate() {
            let [a, b, c] = f.map(|k| CUBE_VERTICES[k]);
            let geometric = (b - a).cross(c - a).normalize();
            assert!(geometric.approx_eq(CUBE_FACE_NORMALS[i / 2], 1e-12), "triangle {}", i);
        }
    }

    #[test]
    fn test_model_matrix_order() {
        let cube = Cube {
            position: Vec3::new(10.0, 0.0, 0.0),
            rotation: Vec3::new(0.0, 0.0, FRAC_PI_2),
            scale: 2.0,
            ..Cube::default()
        };
        // (0.5, 0, 0) -> scale (1, 0, 0) -> rotZ (0, 1, 0) -> translate (10, 1, 0)
        let p = cube.model_matrix().transform_point(Vec3::new(0.5, 0.0, 0.0));
        assert!(p.approx_eq(Vec3::new(10.0, 1.0, 0.0), 1e-12));
    }

    #[test]
    fn test_rotation_order_x_before_z() {
        let cube = Cube {
            rotation: Vec3::new(FRAC_PI_2, 0.0, FRAC_PI_2),
            ..Cube::default()
        };
        // Y --rotX--> Z --rotZ--> Z
        let p = cube.model_matrix().transform_point(Vec3::new(0.0, 1.0, 0.0));
        assert!(p.approx_eq(Vec3::new(0.0, 0.0, 1.0), 1e-12));
    }

    #[test]
    fn test_world_vertices() {
        let cube = Cube { position: Vec3::new(1.0, 2.0, 3.0), ..Cube::default() };
        let v = cube.world_vertices();
        assert!(v[0].approx_eq(Vec3::new(0.5, 1.5, 2.5), 1e-12));
        assert!(v[6].approx_eq(Vec3::new(1.5, 2.5, 3.5), 1e-12));
    }

    #[test]
    fn test_shading_mode_toggle() {
        assert_eq!(ShadingMode::Flat.toggled(), ShadingMode::Phong);
        assert_eq!(ShadingMode::Phong.toggled().label(), "flat");
    }
}
