//! Sutherland-Hodgman polygon clipping in homogeneous clip space
//!
//! The view volume is the intersection of six half-spaces
//! `±x + w >= 0`, `±y + w >= 0`, `±z + w >= 0`. A polygon is clipped
//! against each plane in turn; attributes are interpolated with the same
//! parameter as the position.

use super::math::{Vec3, Vec4};

/// Signed distances at or above this count as inside
pub const INSIDE_EPSILON: f64 = -1e-5;

/// Below this |da - db| an edge is treated as parallel to the plane
pub const PARALLEL_EPSILON: f64 = 1e-9;

/// Upper bound on vertices produced by clipping a triangle
pub const MAX_CLIPPED_VERTICES: usize = 9;

/// Clip-space vertex with interpolable attributes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVertex {
    pub position: Vec4,
    pub normal: Vec3,
    /// World-space position, used for per-pixel lighting
    pub world: Vec3,
}

impl ClipVertex {
    pub fn new(position: Vec4, normal: Vec3, world: Vec3) -> Self {
        Self { position, normal, world }
    }

    pub fn lerp(&self, other: &ClipVertex, t: f64) -> ClipVertex {
        ClipVertex {
            position: self.position.lerp(other.position, t),
            normal: self.normal.lerp(other.normal, t),
            world: self.world.lerp(other.world, t),
        }
    }
}

/// One of the six canonical clip planes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPlane {
    Near,
    Far,
    Left,
    Right,
    Bottom,
    Top,
}

impl ClipPlane {
    /// Order in which planes are applied
    pub const ALL: [ClipPlane; 6] = [
        ClipPlane::Near,
        ClipPlane::Far,
        ClipPlane::Left,
        ClipPlane::Right,
        ClipPlane::Bottom,
        ClipPlane::Top,
    ];

    /// Plane coefficients (a, b, c, d) for `a*x + b*y + c*z + d*w >= 0`
    pub fn coefficients(self) -> Vec4 {
        match self {
            ClipPlane::Near => Vec4::new(0.0, 0.0, 1.0, 1.0),
            ClipPlane::Far => Vec4::new(0.0, 0.0, -1.0, 1.0),
            ClipPlane::Left => Vec4::new(1.0, 0.0, 0.0, 1.0),
            ClipPlane::Right => Vec4::new(-1.0, 0.0, 0.0, 1.0),
            ClipPlane::Bottom => Vec4::new(0.0, 1.0, 0.0, 1.0),
            ClipPlane::Top => Vec4::new(0.0, -1.0, 0.0, 1.0),
        }
    }

    pub fn signed_distance(self, p: Vec4) -> f64 {
        self.coefficients().dot(p)
    }

    pub fn contains(self, p: Vec4) -> bool {
        self.signed_distance(p) >= INSIDE_EPSILON
    }
}

/// Point where edge a->b crosses the plane. A (near) parallel edge yields
/// `b` unchanged.
pub fn intersect(a: &ClipVertex, b: &ClipVertex, plane: ClipPlane) -> ClipVertex {
    let da = plane.signed_distance(a.position);
    let db = plane.signed_distance(b.position);
    let denom = da - db;
    if denom.abs() < PARALLEL_EPSILON {
        return *b;
    }
    a.lerp(b, da / denom)
}

/// Clip a ring of vertices against one plane
pub fn clip_against_plane(input: &[ClipVertex], plane: ClipPlane) -> Vec<ClipVertex> {
    let n = input.len();
    let mut output = Vec::with_capacity(n + 1);

    for i in 0..n {
        let curr = &input[i];
        let prev = &input[(i + n - 1) % n];
        let curr_in = plane.contains(curr.position);
        let prev_in = plane.contains(prev.position);

        if curr_in {
            if !prev_in {
                output.push(intersect(prev, curr, plane));
            }
            output.push(*curr);
        } else if prev_in {
            output.push(intersect(prev, curr, plane));
        }
    }

    output
}

/// Clip a polygon against all six planes.
/// The result may be empty; callers drop anything with fewer than 3 vertices.
pub fn clip_polygon(polygon: &[ClipVertex]) -> Vec<ClipVertex> {
    let mut output = polygon.to_vec();
    for plane in ClipPlane::ALL {
        if output.is_empty() {
            break;
        }
        output = clip_against_plane(&output, plane);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vert(x: f64, y: f64, z: f64, w: f64) -> ClipVertex {
        ClipVertex::new(Vec4::new(x, y, z, w), Vec3::new(x, y, z), Vec3::new(x, y, z))
    }

    fn fully_inside(poly: &[ClipVertex]) -> bool {
        poly.iter().all(|v| ClipPlane::ALL.iter().all(|p| p.contains(v.position)))
    }

    #[test]
    fn test_inside_triangle_unchanged() {
        let tri = [
            vert(-0.5, -0.5, 0.2, 1.0),
            vert(0.5, -0.5, 0.4, 1.0),
            vert(0.0, 0.5, 0.6, 1.0),
        ];
        let out = clip_polygon(&tri);
        assert_eq!(out.len(), 3);
        for v in &tri {
            assert!(out.iter().any(|o| o.position.approx_eq(v.position, 1e-12)));
        }
    }

    #[test]
    fn test_outside_one_plane_is_empty() {
        for plane in ClipPlane::ALL {
            // Push a triangle beyond the plane along its normal
            let c = plane.coefficients();
            let off = Vec3::new(-c.x, -c.y, -c.z) * 3.0;
            let tri = [
                vert(off.x, off.y, off.z, 1.0),
                vert(off.x + 0.1, off.y, off.z, 1.0),
                vert(off.x, off.y + 0.1, off.z + 0.1, 1.0),
            ];
            assert!(clip_against_plane(&tri, plane).is_empty(), "{:?}", plane);
            assert!(clip_polygon(&tri).is_empty(), "{:?}", plane);
        }
    }

    #[test]
    fn test_straddling_triangle_is_cut() {
        // One vertex beyond the right plane (x > w)
        let tri = [
            vert(0.0, 0.0, 0.5, 1.0),
            vert(3.0, 0.0, 0.5, 1.0),
            vert(0.0, 0.5, 0.5, 1.0),
        ];
        let out = clip_polygon(&tri);
        assert_eq!(out.len(), 4);
        assert!(fully_inside(&out));
        // Intersections land exactly on x = w
        assert!(out.iter().filter(|v| (v.position.x - v.position.w).abs() < 1e-9).count() == 2);
    }

    #[test]
    fn test_attributes_interpolated_with_position() {
        let a = vert(0.0, 0.0, 0.5, 1.0);
        let b = vert(2.0, 0.0, 0.5, 1.0);
        let hit = intersect(&a, &b, ClipPlane::Right);
        assert!((hit.position.x - 1.0).abs() < 1e-12);
        // Attributes equal the position-derived values at t = 0.5
        assert!(hit.normal.approx_eq(Vec3::new(1.0, 0.0, 0.5), 1e-12));
        assert!(hit.world.approx_eq(Vec3::new(1.0, 0.0, 0.5), 1e-12));
    }

    #[test]
    fn test_parallel_edge_returns_second_endpoint() {
        // Both endpoints equally far outside the left plane
        let a = vert(-2.0, 0.0, 0.5, 1.0);
        let b = vert(-2.0, 0.7, 0.3, 1.0);
        let hit = intersect(&a, &b, ClipPlane::Left);
        assert_eq!(hit, b);
    }

    #[test]
    fn test_boundary_tolerance() {
        let v = Vec4::new(1.0 + 5e-6, 0.0, 0.0, 1.0);
        assert!(ClipPlane::Right.contains(v));
        let v = Vec4::new(1.0 + 1e-4, 0.0, 0.0, 1.0);
        assert!(!ClipPlane::Right.contains(v));
    }

    #[test]
    fn test_never_more_than_nine_vertices() {
        // Large triangles around the frustum, cut by several planes at once
        let cases = [
            [vert(-5.0, -5.0, 0.5, 1.0), vert(5.0, -5.0, 0.5, 1.0), vert(0.0, 6.0, 0.5, 1.0)],
            [vert(-3.0, 0.2, -2.0, 1.0), vert(3.0, -4.0, 0.5, 1.0), vert(0.5, 4.0, 3.0, 1.0)],
            [vert(-1.6, -1.6, 0.5, 1.0), vert(1.6, -1.6, 0.5, 1.0), vert(1.6, 1.6, 0.5, 1.0)],
            [vert(-10.0, 0.0, -10.0, 1.0), vert(10.0, 10.0, 10.0, 1.0), vert(0.0, -10.0, 0.5, 1.0)],
        ];
        for tri in cases {
            let out = clip_polygon(&tri);
            assert!(out.len() <= MAX_CLIPPED_VERTICES, "{} vertices", out.len());
            assert!(fully_inside(&out));
        }
    }

    #[test]
    fn test_triangle_covering_frustum_becomes_square() {
        let tri = [
            vert(-10.0, -10.0, 0.5, 1.0),
            vert(10.0, -10.0, 0.5, 1.0),
            vert(0.0, 10.0, 0.5, 1.0),
        ];
        let out = clip_polygon(&tri);
        assert_eq!(out.len(), 4);
        for v in &out {
            assert!((v.position.x.abs() - 1.0).abs() < 1e-9);
            assert!((v.position.y.abs() - 1.0).abs() < 1e-9);
        }
    }
}
