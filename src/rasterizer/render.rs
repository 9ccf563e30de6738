//! Core rendering functions
//! Per-cube transform, culling, clipping and triangle rasterization

use super::camera::CameraBasis;
use super::clip::{clip_polygon, ClipVertex};
use super::math::{barycentric, Mat4, Vec3, Vec4};
use super::pipeline::perspective_divide;
use super::shading::shade;
use super::types::{
    pack_rgb, Color, Cube, Light, Material, RenderSettings, Scene, ShadingMode, CUBE_FACES,
    CUBE_FACE_NORMALS,
};

/// Framebuffer for software rendering
///
/// Smaller depth is nearer. Depth is cleared to +infinity and a write passes
/// when `z <= stored`, so among equal depths the last writer wins.
pub struct Framebuffer {
    pub color: Vec<u32>,  // 0xAARRGGBB
    pub depth: Vec<f64>,  // Depth buffer
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            color: vec![Color::BLACK.to_argb(); width * height],
            depth: vec![f64::INFINITY; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self, background: u32) {
        self.color.fill(background);
        self.depth.fill(f64::INFINITY);
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        self.index(x, y).map(|i| self.color[i])
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f64> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Would a fragment at depth z be kept? Out of bounds is never kept.
    pub fn depth_passes(&self, x: usize, y: usize, z: f64) -> bool {
        match self.index(x, y) {
            Some(i) => z <= self.depth[i],
            None => false,
        }
    }

    /// Depth-tested write of a packed color. Returns true if the pixel was written.
    pub fn set_pixel_with_depth(&mut self, x: usize, y: usize, z: f64, color: u32) -> bool {
        let Some(idx) = self.index(x, y) else {
            log::trace!("dropping write at ({}, {}) outside {}x{}", x, y, self.width, self.height);
            return false;
        };
        if z <= self.depth[idx] {
            self.depth[idx] = z;
            self.color[idx] = color;
            return true;
        }
        false
    }

    /// Depth-tested write of a linear color, clamped before packing
    pub fn depth_test_and_set(&mut self, x: usize, y: usize, z: f64, rgb: Vec3) -> bool {
        self.set_pixel_with_depth(x, y, z, pack_rgb(rgb))
    }

    /// Copy out as packed 0xAARRGGBB, row-major, top row first
    pub fn copy_to(&self, out: &mut [u32]) {
        let n = self.color.len().min(out.len());
        out[..n].copy_from_slice(&self.color[..n]);
    }

    /// RGBA bytes, for textures and PNG
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.color
            .iter()
            .flat_map(|&p| Color::from_argb(p).to_bytes())
            .collect()
    }

    /// RGB bytes, for PPM
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.color
            .iter()
            .flat_map(|&p| {
                let c = Color::from_argb(p);
                [c.r, c.g, c.b]
            })
            .collect()
    }
}

/// Post-divide vertex in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub x: f64,
    pub y: f64,
    /// Depth after the viewport transform
    pub z: f64,
    pub normal: Vec3,
    pub world: Vec3,
}

impl ScreenVertex {
    fn pos(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// How a face gets its color
pub struct FaceShading<'a> {
    pub mode: ShadingMode,
    /// Used as-is in flat mode
    pub flat_color: u32,
    pub material: &'a Material,
    pub lights: &'a [Light],
    pub eye: Vec3,
}

/// Frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub cubes: usize,
    /// Triangles considered (12 per cube)
    pub triangles: usize,
    pub backface_culled: usize,
    /// Entirely outside the view volume
    pub clipped_away: usize,
    /// Triangles that reached the rasterizer
    pub rasterized: usize,
    /// Depth-test passes
    pub pixels_written: usize,
}

/// Rasterize a single triangle with bounding box + barycentric coverage.
/// Pixels are sampled at their centres. Returns the number of pixels written.
pub fn rasterize_triangle(
    fb: &mut Framebuffer,
    v1: &ScreenVertex,
    v2: &ScreenVertex,
    v3: &ScreenVertex,
    shading: &FaceShading,
) -> usize {
    if fb.width == 0 || fb.height == 0 {
        return 0;
    }

    // Bounding box of candidate pixel centres
    let min_x = (v1.x.min(v2.x).min(v3.x) - 0.5).ceil().max(0.0);
    let max_x = (v1.x.max(v2.x).max(v3.x) - 0.5).floor().min(fb.width as f64 - 1.0);
    let min_y = (v1.y.min(v2.y).min(v3.y) - 0.5).ceil().max(0.0);
    let max_y = (v1.y.max(v2.y).max(v3.y) - 0.5).floor().min(fb.height as f64 - 1.0);
    if !(min_x <= max_x && min_y <= max_y) {
        return 0;
    }

    let (p1, p2, p3) = (v1.pos(), v2.pos(), v3.pos());
    let mut written = 0;

    for y in (min_y as usize)..=(max_y as usize) {
        for x in (min_x as usize)..=(max_x as usize) {
            let bc = barycentric(x as f64 + 0.5, y as f64 + 0.5, p1, p2, p3);
            if bc.x < 0.0 || bc.y < 0.0 || bc.z < 0.0 {
                continue;
            }

            let z = bc.x * p1.z + bc.y * p2.z + bc.z * p3.z;
            if !fb.depth_passes(x, y, z) {
                continue;
            }

            let color = match shading.mode {
                ShadingMode::Flat => shading.flat_color,
                ShadingMode::Phong => {
                    let normal = v1.normal * bc.x + v2.normal * bc.y + v3.normal * bc.z;
                    let world = v1.world * bc.x + v2.world * bc.y + v3.world * bc.z;
                    pack_rgb(shade(normal, world, shading.material, shading.lights, shading.eye))
                }
            };

            if fb.set_pixel_with_depth(x, y, z, color) {
                written += 1;
            }
        }
    }

    written
}

/// Rasterize a convex polygon as a fan around its first vertex
pub fn rasterize_polygon(fb: &mut Framebuffer, verts: &[ScreenVertex], shading: &FaceShading) -> usize {
    if verts.len() < 3 {
        return 0;
    }
    (1..verts.len() - 1)
        .map(|i| rasterize_triangle(fb, &verts[0], &verts[i], &verts[i + 1], shading))
        .sum()
}

/// Matrices shared by every cube of a frame
pub struct FrameTransforms {
    pub eye: Vec3,
    /// World to clip
    pub clip: Mat4,
    /// NDC to pixels
    pub screen: Mat4,
}

impl FrameTransforms {
    pub fn new(basis: &CameraBasis, width: usize, height: usize) -> Self {
        Self {
            eye: basis.vrp,
            clip: basis.clip_matrix(),
            screen: basis.screen_matrix(width, height),
        }
    }

    /// Divide by w and map to pixels
    pub fn to_screen(&self, v: &ClipVertex) -> ScreenVertex {
        let s = self.screen.transform_point(perspective_divide(v.position));
        ScreenVertex {
            x: s.x,
            y: s.y,
            z: s.z,
            normal: v.normal,
            world: v.world,
        }
    }
}

/// Transform, cull, clip and rasterize the 12 triangles of one cube
pub fn render_cube(
    fb: &mut Framebuffer,
    cube: &Cube,
    frame: &FrameTransforms,
    lights: &[Light],
    settings: &RenderSettings,
    stats: &mut RenderStats,
) {
    let model = cube.model_matrix();
    let world = cube.world_vertices();
    stats.cubes += 1;

    for (f, &[i0, i1, i2]) in CUBE_FACES.iter().enumerate() {
        stats.triangles += 1;

        let normal = model.transform_direction(CUBE_FACE_NORMALS[f / 2]).normalize();

        // Backface culling - keep faces whose normal points toward the eye
        if settings.backface_cull && normal.dot(frame.eye - world[i0]) <= 0.0 {
            stats.backface_culled += 1;
            continue;
        }

        let polygon: Vec<ClipVertex> = [i0, i1, i2]
            .iter()
            .map(|&i| ClipVertex::new(frame.clip * Vec4::point(world[i]), normal, world[i]))
            .collect();

        let clipped = clip_polygon(&polygon);
        if clipped.len() < 3 {
            stats.clipped_away += 1;
            continue;
        }

        let screen: Vec<ScreenVertex> = clipped.iter().map(|v| frame.to_screen(v)).collect();

        let flat_color = match settings.shading {
            ShadingMode::Flat => pack_rgb(shade(normal, world[i0], &cube.material, lights, frame.eye)),
            ShadingMode::Phong => 0,
        };
        let shading = FaceShading {
            mode: settings.shading,
            flat_color,
            material: &cube.material,
            lights,
            eye: frame.eye,
        };

        stats.rasterized += 1;
        stats.pixels_written += rasterize_polygon(fb, &screen, &shading);
    }
}

/// Draw every cube of the scene, in order, into an already cleared framebuffer
pub fn render_scene(scene: &Scene, fb: &mut Framebuffer, settings: &RenderSettings) -> RenderStats {
    let basis = scene.camera.basis();
    let frame = FrameTransforms::new(&basis, fb.width, fb.height);
    let mut stats = RenderStats::default();

    for cube in &scene.cubes {
        render_cube(fb, cube, &frame, &scene.lights, settings, &mut stats);
    }

    log::debug!(
        "rendered {} cubes: {} culled, {} clipped away, {} rasterized, {} pixels ({} shading)",
        stats.cubes,
        stats.backface_culled,
        stats.clipped_away,
        stats.rasterized,
        stats.pixels_written,
        settings.shading.label(),
    );

    stats
}
