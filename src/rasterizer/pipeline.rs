//! Stage matrices of the viewing pipeline
//!
//! World to clip space is `P * D * C * B * A`:
//! - A: translate the view reference point to the origin
//! - B: rotate into the camera basis (u, v, n)
//! - C: shear so the projection window is centred on the n axis
//! - D: scale the window by near/far so the far plane lands at z = 1
//! - P: perspective setup (near maps to depth 0, far to depth w)
//!
//! NDC to pixels is `M * L * K * J`: flip Y, remap [-1,1] to [0,1],
//! scale to the viewport, shift by half a pixel.

use super::math::{Mat4, Vec3, Vec4};

/// Smallest |w| used by the perspective divide
pub const MIN_W: f64 = 1e-6;

/// A: move the view reference point to the origin
pub fn translate_to_origin(vrp: Vec3) -> Mat4 {
    Mat4::translation(-vrp)
}

/// B: rows are the camera basis vectors
pub fn rotate_to_basis(u: Vec3, v: Vec3, n: Vec3) -> Mat4 {
    Mat4::from_rows([
        [u.x, u.y, u.z, 0.0],
        [v.x, v.y, v.z, 0.0],
        [n.x, n.y, n.z, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// C: shear the window centre (cu, cv) at distance d onto the n axis
pub fn recenter_window(cu: f64, cv: f64, d: f64) -> Mat4 {
    Mat4::from_rows([
        [1.0, 0.0, -cu / d, 0.0],
        [0.0, 1.0, -cv / d, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// D: normalize the window half-extents (su, sv) and the far distance
pub fn normalize_window(su: f64, sv: f64, d: f64, far: f64) -> Mat4 {
    Mat4::scale_xyz(Vec3::new(d / (su * far), d / (sv * far), 1.0 / far))
}

/// P: after D the near plane sits at z = near/far and the far plane at z = 1.
/// Maps those to depth 0 and depth w respectively, with w' = z.
pub fn perspective(far: f64, near: f64) -> Mat4 {
    let a = far / (far - near);
    let b = -near / (far - near);
    Mat4::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, a, b],
        [0.0, 0.0, 1.0, 0.0],
    ])
}

/// J: flip Y so +Y points down the screen
pub fn flip_y() -> Mat4 {
    Mat4::scale_xyz(Vec3::new(1.0, -1.0, 1.0))
}

/// K: [-1, 1] to [0, 1] in x and y, depth untouched
pub fn ndc_to_unit() -> Mat4 {
    Mat4::from_rows([
        [0.5, 0.0, 0.0, 0.5],
        [0.0, 0.5, 0.0, 0.5],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// L: [0, 1] to viewport pixels and depth to [z_min, z_max]
pub fn unit_to_viewport(
    x_max: f64,
    x_min: f64,
    y_max: f64,
    y_min: f64,
    z_max: f64,
    z_min: f64,
) -> Mat4 {
    Mat4::from_rows([
        [x_max - x_min, 0.0, 0.0, x_min],
        [0.0, y_max - y_min, 0.0, y_min],
        [0.0, 0.0, z_max - z_min, z_min],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// M: half-pixel shift on every axis
pub fn half_pixel_shift() -> Mat4 {
    Mat4::translation(Vec3::new(0.5, 0.5, 0.5))
}

/// Divide by w. A near-zero w is clamped to MIN_W keeping its sign.
pub fn perspective_divide(clip: Vec4) -> Vec3 {
    let w = if clip.w.abs() < MIN_W {
        log::trace!("clamping w = {} to +/-{}", clip.w, MIN_W);
        if clip.w.is_sign_negative() { -MIN_W } else { MIN_W }
    } else {
        clip.w
    };
    Vec3::new(clip.x / w, clip.y / w, clip.z / w)
}
