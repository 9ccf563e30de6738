//! Look-at camera and its derived view/projection state
//!
//! `Camera` holds the user-facing parameters. `Camera::basis()` derives an
//! immutable `CameraBasis` snapshot (u, v, n and the projection window) that
//! every matrix is built from. Mutating the camera afterwards does not touch
//! an existing snapshot; call `basis()` again.

use serde::{Serialize, Deserialize};

use super::math::{Mat4, Vec3};
use super::pipeline;

fn default_up() -> Vec3 {
    Vec3::UP
}

fn default_z_max() -> f64 {
    1.0
}

/// Camera parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Eye position (view reference point)
    pub eye: Vec3,
    /// Point the camera looks at
    pub center: Vec3,
    /// Up hint, must not be parallel to `center - eye`
    #[serde(default = "default_up")]
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_y: f64,
    /// Width / height
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    /// Projection window centre offset (cu, cv) on the near plane
    #[serde(default)]
    pub window_center: (f64, f64),
    /// Depth range written to the depth buffer
    #[serde(default)]
    pub z_min: f64,
    #[serde(default = "default_z_max")]
    pub z_max: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            center: Vec3::ZERO,
            up: Vec3::UP,
            fov_y: 60.0,
            aspect: 4.0 / 3.0,
            near: 1.0,
            far: 100.0,
            window_center: (0.0, 0.0),
            z_min: 0.0,
            z_max: 1.0,
        }
    }
}

impl Camera {
    pub fn look_at(eye: Vec3, center: Vec3) -> Self {
        Self {
            eye,
            center,
            ..Self::default()
        }
    }

    pub fn with_fov(mut self, fov_y: f64) -> Self {
        self.fov_y = fov_y;
        self
    }

    pub fn with_clip(mut self, near: f64, far: f64) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn with_aspect_for(mut self, width: usize, height: usize) -> Self {
        self.aspect = width as f64 / height.max(1) as f64;
        self
    }

    /// True when the basis can be derived (up not parallel to the view
    /// direction, eye distinct from center)
    pub fn has_valid_basis(&self) -> bool {
        let forward = self.center - self.eye;
        forward.len() > 1e-12 && forward.normalize().cross(self.up).len() > 1e-9
    }

    /// Derive the orthonormal basis and projection window.
    ///
    /// Equal near/far planes or an up hint parallel to the view direction
    /// are caller errors; both are checked in debug builds only.
    pub fn basis(&self) -> CameraBasis {
        debug_assert!(self.near != self.far, "camera near and far planes are equal");
        debug_assert!(self.has_valid_basis(), "camera up is parallel to the view direction");

        let n = (self.center - self.eye).normalize();
        let u = n.cross(self.up).normalize();
        let v = u.cross(n);

        let d = self.near;
        let sv = d * (self.fov_y.to_radians() * 0.5).tan();
        let su = sv * self.aspect;

        CameraBasis {
            vrp: self.eye,
            u,
            v,
            n,
            d,
            su,
            sv,
            cu: self.window_center.0,
            cv: self.window_center.1,
            near: self.near,
            far: self.far,
            z_min: self.z_min,
            z_max: self.z_max,
        }
    }

    /// Rotate the eye around the center. Pitch is kept away from the poles
    /// so the up hint never becomes parallel to the view direction.
    pub fn orbit(&mut self, d_yaw: f64, d_pitch: f64) {
        let offset = self.eye - self.center;
        let radius = offset.len();
        if radius == 0.0 {
            return;
        }
        let limit = std::f64::consts::FRAC_PI_2 - 0.01;
        let yaw = offset.x.atan2(offset.z) + d_yaw;
        let pitch = ((offset.y / radius).asin() + d_pitch).clamp(-limit, limit);

        self.eye = self.center
            + Vec3::new(
                pitch.cos() * yaw.sin(),
                pitch.sin(),
                pitch.cos() * yaw.cos(),
            ) * radius;
    }

    /// Move the eye along the view direction, never past `near` from the center
    pub fn zoom(&mut self, factor: f64) {
        let offset = self.eye - self.center;
        let radius = (offset.len() * factor).max(self.near * 1.5);
        self.eye = self.center + offset.normalize() * radius;
    }
}

/// Immutable snapshot of everything the pipeline needs from a camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub vrp: Vec3,
    /// Right
    pub u: Vec3,
    /// Up
    pub v: Vec3,
    /// Forward
    pub n: Vec3,
    /// Projection plane distance
    pub d: f64,
    /// Window half-extents at distance d
    pub su: f64,
    pub sv: f64,
    /// Window centre
    pub cu: f64,
    pub cv: f64,
    pub near: f64,
    pub far: f64,
    pub z_min: f64,
    pub z_max: f64,
}

/// The five projection stages, kept separate for inspection and testing
#[derive(Debug, Clone, Copy)]
pub struct ProjectionStages {
    pub a: Mat4,
    pub b: Mat4,
    pub c: Mat4,
    pub d: Mat4,
    pub p: Mat4,
}

impl ProjectionStages {
    /// World to clip space: P * D * C * B * A
    pub fn compose(&self) -> Mat4 {
        self.p * self.d * self.c * self.b * self.a
    }
}

impl CameraBasis {
    /// World to camera space: translate the eye to the origin, then rotate
    pub fn view_matrix(&self) -> Mat4 {
        pipeline::rotate_to_basis(self.u, self.v, self.n) * pipeline::translate_to_origin(self.vrp)
    }

    /// Camera to clip space in one matrix (closed form of P * D * C)
    pub fn projection_matrix(&self) -> Mat4 {
        let (n, f) = (self.near, self.far);
        Mat4::from_rows([
            [self.d / (self.su * f), 0.0, -self.cu / (self.su * f), 0.0],
            [0.0, self.d / (self.sv * f), -self.cv / (self.sv * f), 0.0],
            [0.0, 0.0, 1.0 / (f - n), -n / (f - n)],
            [0.0, 0.0, 1.0 / f, 0.0],
        ])
    }

    pub fn stages(&self) -> ProjectionStages {
        ProjectionStages {
            a: pipeline::translate_to_origin(self.vrp),
            b: pipeline::rotate_to_basis(self.u, self.v, self.n),
            c: pipeline::recenter_window(self.cu, self.cv, self.d),
            d: pipeline::normalize_window(self.su, self.sv, self.d, self.far),
            p: pipeline::perspective(self.far, self.near),
        }
    }

    /// World to clip space
    pub fn clip_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// NDC to pixel coordinates for a width x height viewport
    pub fn screen_matrix(&self, width: usize, height: usize) -> Mat4 {
        pipeline::half_pixel_shift()
            * pipeline::unit_to_viewport(width as f64, 0.0, height as f64, 0.0, self.z_max, self.z_min)
            * pipeline::ndc_to_unit()
            * pipeline::flip_y()
    }
}
