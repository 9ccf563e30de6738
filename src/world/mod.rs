//! World module - scene description and the render entry point
//!
//! A `SceneDescriptor` is the strongly typed form of everything a caller
//! passes in for one frame: image size, camera, up to `MAX_CUBES` cubes,
//! up to `MAX_LIGHTS` lights, and the shading mode. It is validated before
//! anything is drawn.

mod export;
mod scene_file;

pub use export::*;
pub use scene_file::*;

use serde::{Serialize, Deserialize};

use crate::rasterizer::{
    render_scene, Camera, Cube, Framebuffer, Light, Material, RenderSettings, RenderStats, Scene,
    ShadingMode, Vec3, DEFAULT_BACKGROUND,
};

/// Most cubes a single scene may hold
pub const MAX_CUBES: usize = 10;
/// Most lights a single scene may hold
pub const MAX_LIGHTS: usize = 5;
/// Largest image, in pixels, a scene may request (8192 x 8192)
pub const MAX_PIXELS: usize = 8192 * 8192;

fn default_scale() -> f64 {
    1.0
}

fn default_shininess() -> f64 {
    32.0
}

/// Camera parameters as supplied by a caller. Up is always +Y and the
/// aspect ratio follows the image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    pub eye: Vec3,
    pub center: Vec3,
    /// Vertical field of view in degrees
    pub fov: f64,
    pub near: f64,
    pub far: f64,
}

/// One cube instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubeDescriptor {
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: f64,
    pub color: Vec3,
    pub ka: f64,
    pub kd: f64,
    pub ks: f64,
    #[serde(default = "default_shininess")]
    pub shininess: f64,
}

impl CubeDescriptor {
    pub fn to_cube(&self) -> Cube {
        Cube {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            material: Material {
                color: self.color,
                ka: self.ka,
                kd: self.kd,
                ks: self.ks,
                shininess: self.shininess,
            },
        }
    }
}

/// A complete frame request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub width: usize,
    pub height: usize,
    pub camera: CameraDescriptor,
    #[serde(default)]
    pub cubes: Vec<CubeDescriptor>,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub shading: ShadingMode,
    /// Packed 0xAARRGGBB clear color, DEFAULT_BACKGROUND when absent
    #[serde(default)]
    pub background: Option<u32>,
}

fn invalid(msg: impl Into<String>) -> SceneError {
    SceneError::Invalid(msg.into())
}

impl SceneDescriptor {
    /// Three cubes and two lights, seen from (3, 2, 4)
    pub fn demo() -> Self {
        let cube = |position: Vec3, rotation: Vec3, scale: f64, color: Vec3, ks: f64| CubeDescriptor {
            position,
            rotation,
            scale,
            color,
            ka: 0.1,
            kd: 0.7,
            ks,
            shininess: 32.0,
        };

        Self {
            width: 800,
            height: 600,
            camera: CameraDescriptor {
                eye: Vec3::new(3.0, 2.0, 4.0),
                center: Vec3::ZERO,
                fov: 60.0,
                near: 0.1,
                far: 100.0,
            },
            cubes: vec![
                cube(Vec3::new(-1.5, 0.0, 0.0), Vec3::new(0.0, 0.5, 0.0), 1.0, Vec3::new(0.8, 0.2, 0.2), 0.3),
                cube(Vec3::new(1.5, 0.0, 0.0), Vec3::new(0.3, 0.0, 0.0), 1.0, Vec3::new(0.2, 0.8, 0.2), 0.3),
                cube(Vec3::new(0.0, 1.5, 0.0), Vec3::new(0.0, 0.0, 0.3), 0.8, Vec3::new(0.2, 0.2, 0.8), 0.5),
            ],
            lights: vec![
                Light::new(Vec3::new(5.0, 5.0, 5.0), Vec3::ONE, 1.0),
                Light::new(Vec3::new(-3.0, 2.0, 3.0), Vec3::new(0.5, 0.5, 0.8), 0.5),
            ],
            shading: ShadingMode::Phong,
            background: None,
        }
    }

    /// Check bounds and preconditions the pipeline does not guard itself
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid(format!("image size {}x{} is empty", self.width, self.height)));
        }
        match self.width.checked_mul(self.height) {
            Some(pixels) if pixels <= MAX_PIXELS => {}
            _ => {
                return Err(invalid(format!(
                    "image size {}x{} exceeds the limit of {} pixels",
                    self.width, self.height, MAX_PIXELS
                )))
            }
        }
        if self.cubes.len() > MAX_CUBES {
            return Err(invalid(format!("{} cubes exceeds the limit of {}", self.cubes.len(), MAX_CUBES)));
        }
        if self.lights.len() > MAX_LIGHTS {
            return Err(invalid(format!("{} lights exceeds the limit of {}", self.lights.len(), MAX_LIGHTS)));
        }

        let cam = &self.camera;
        if !(cam.near.is_finite() && cam.far.is_finite() && cam.near > 0.0 && cam.near < cam.far) {
            return Err(invalid(format!("need 0 < near < far, got near {} far {}", cam.near, cam.far)));
        }
        if !(cam.fov > 0.0 && cam.fov < 180.0) {
            return Err(invalid(format!("field of view {} is outside (0, 180)", cam.fov)));
        }
        if !self.to_camera().has_valid_basis() {
            return Err(invalid("view direction is zero or parallel to +Y"));
        }

        for (i, cube) in self.cubes.iter().enumerate() {
            if !(cube.scale.is_finite() && cube.scale > 0.0) {
                return Err(invalid(format!("cube {} has scale {}", i, cube.scale)));
            }
        }

        Ok(())
    }

    pub fn to_camera(&self) -> Camera {
        Camera::look_at(self.camera.eye, self.camera.center)
            .with_fov(self.camera.fov)
            .with_clip(self.camera.near, self.camera.far)
            .with_aspect_for(self.width, self.height)
    }

    pub fn to_scene(&self) -> Scene {
        Scene {
            camera: self.to_camera(),
            cubes: self.cubes.iter().map(CubeDescriptor::to_cube).collect(),
            lights: self.lights.clone(),
        }
    }

    pub fn settings(&self) -> RenderSettings {
        RenderSettings {
            shading: self.shading,
            background: self.background.unwrap_or(DEFAULT_BACKGROUND),
            backface_cull: true,
        }
    }
}

/// Validate, allocate a cleared framebuffer and draw the scene
pub fn render_frame(desc: &SceneDescriptor) -> Result<(Framebuffer, RenderStats), SceneError> {
    desc.validate()?;

    let settings = desc.settings();
    let mut fb = Framebuffer::new(desc.width, desc.height);
    fb.clear(settings.background);

    let stats = render_scene(&desc.to_scene(), &mut fb, &settings);
    Ok((fb, stats))
}

pub fn render(desc: &SceneDescriptor) -> Result<Framebuffer, SceneError> {
    render_frame(desc).map(|(fb, _)| fb)
}

/// Render into a caller-provided `width * height` buffer of 0xAARRGGBB pixels
pub fn render_into(desc: &SceneDescriptor, out: &mut [u32]) -> Result<RenderStats, SceneError> {
    let expected = desc
        .width
        .checked_mul(desc.height)
        .ok_or_else(|| invalid(format!("image size {}x{} overflows", desc.width, desc.height)))?;
    if out.len() != expected {
        return Err(invalid(format!("output buffer holds {} pixels, need {}", out.len(), expected)));
    }
    let (fb, stats) = render_frame(desc)?;
    fb.copy_to(out);
    Ok(stats)
}
