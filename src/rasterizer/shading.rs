//! Local illumination (Lambert diffuse + Blinn-Phong specular)

use super::math::Vec3;
use super::types::{Light, Material};

/// Sum the contribution of every light at a surface point and clamp once.
///
/// Per light: ambient `color * ka`, diffuse `color * kd * max(0, N.L) * I`,
/// specular `light_color * ks * max(0, N.H)^shininess * I`.
/// No attenuation and no shadowing. With no lights the result is black.
pub fn compute_lighting(
    normal: Vec3,
    position: Vec3,
    material: &Material,
    lights: &[Light],
    eye: Vec3,
) -> Vec3 {
    let n = normal.normalize();
    let view = (eye - position).normalize();

    let mut total = Vec3::ZERO;
    for light in lights {
        let l = (light.position - position).normalize();
        let h = (view + l).normalize();

        let ambient = material.color * material.ka;
        let diffuse = material.color * (material.kd * n.dot(l).max(0.0) * light.intensity);
        let n_dot_h = n.dot(h);
        // powf(0.0) is 1 even for a zero base
        let spec = if n_dot_h > 0.0 { n_dot_h.powf(material.shininess) } else { 0.0 };
        let specular = light.color * (material.ks * spec * light.intensity);

        total = total + ambient + diffuse + specular;
    }

    total.clamp01()
}

/// Lighting as used by the renderer: an empty light list leaves the
/// surface unlit at its material color instead of black.
pub fn shade(
    normal: Vec3,
    position: Vec3,
    material: &Material,
    lights: &[Light],
    eye: Vec3,
) -> Vec3 {
    if lights.is_empty() {
        return material.color.clamp01();
    }
    compute_lighting(normal, position, material, lights, eye)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_light(position: Vec3) -> Light {
        Light::new(position, Vec3::ONE, 1.0)
    }

    #[test]
    fn test_ambient_only_ignores_light_position() {
        let mat = Material {
            color: Vec3::new(0.8, 0.4, 0.2),
            ka: 0.5,
            kd: 0.0,
            ks: 0.0,
            shininess: 16.0,
        };
        let expected = mat.color * mat.ka;
        for pos in [
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::new(-3.0, 0.0, 0.0),
            Vec3::new(0.0, -10.0, 0.0),
        ] {
            let c = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &[white_light(pos)], Vec3::new(0.0, 0.0, 5.0));
            assert!(c.approx_eq(expected, 1e-12), "{:?}", c);
        }
    }

    #[test]
    fn test_ambient_not_scaled_by_intensity() {
        let mat = Material { ka: 0.2, kd: 0.0, ks: 0.0, ..Material::default() };
        let dim = Light::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ONE, 0.1);
        let c = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &[dim], Vec3::new(0.0, 5.0, 0.0));
        assert!(c.approx_eq(Vec3::new(0.2, 0.2, 0.2), 1e-12));
    }

    #[test]
    fn test_diffuse_scales_with_angle_and_intensity() {
        let mat = Material { color: Vec3::ONE, ka: 0.0, kd: 0.5, ks: 0.0, shininess: 1.0 };
        let eye = Vec3::new(0.0, 10.0, 0.0);
        let head_on = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &[white_light(Vec3::new(0.0, 3.0, 0.0))], eye);
        assert!((head_on.x - 0.5).abs() < 1e-12);

        let slanted = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &[white_light(Vec3::new(3.0, 3.0, 0.0))], eye);
        assert!((slanted.x - 0.5 * std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);

        let half = Light::new(Vec3::new(0.0, 3.0, 0.0), Vec3::ONE, 0.5);
        let dimmed = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &[half], eye);
        assert!((dimmed.x - 0.25).abs() < 1e-12);

        let behind = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &[white_light(Vec3::new(0.0, -3.0, 0.0))], eye);
        assert!(behind.approx_eq(Vec3::ZERO, 1e-12));
    }

    #[test]
    fn test_specular_uses_light_color_and_half_vector() {
        let mat = Material { color: Vec3::ZERO, ka: 0.0, kd: 0.0, ks: 1.0, shininess: 8.0 };
        let red = Light::new(Vec3::new(0.0, 4.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 1.0);
        // Eye and light on the normal: H == N, full highlight
        let c = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &[red], Vec3::new(0.0, 2.0, 0.0));
        assert!(c.approx_eq(Vec3::new(1.0, 0.0, 0.0), 1e-12));

        // Grazing view shrinks the highlight
        let off = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &[red], Vec3::new(5.0, 0.1, 0.0));
        assert!(off.x < 0.5);
    }

    #[test]
    fn test_zero_shininess_facing_away_has_no_highlight() {
        let mat = Material { color: Vec3::ZERO, ka: 0.0, kd: 0.0, ks: 1.0, shininess: 0.0 };
        // Light and eye below the surface: N.H < 0
        let light = [white_light(Vec3::new(0.0, -3.0, 0.0))];
        let c = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &light, Vec3::new(0.0, -2.0, 0.0));
        assert!(c.approx_eq(Vec3::ZERO, 0.0));

        // Facing the half-vector, a zero exponent gives the full ks
        let lit = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &[white_light(Vec3::new(0.0, 3.0, 0.0))], Vec3::UP);
        assert!(lit.approx_eq(Vec3::ONE, 1e-12));
    }

    #[test]
    fn test_lights_sum_then_clamp() {
        let mat = Material { color: Vec3::ONE, ka: 0.4, kd: 0.0, ks: 0.0, shininess: 1.0 };
        let lights = [white_light(Vec3::UP), white_light(Vec3::UP)];
        let two = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &lights, Vec3::UP);
        assert!(two.approx_eq(Vec3::new(0.8, 0.8, 0.8), 1e-12));

        let many = [white_light(Vec3::UP); 4];
        let clamped = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &many, Vec3::UP);
        assert!(clamped.approx_eq(Vec3::ONE, 1e-12));
    }

    #[test]
    fn test_no_lights() {
        let mat = Material { color: Vec3::new(0.3, 0.6, 0.9), ..Material::default() };
        let dark = compute_lighting(Vec3::UP, Vec3::ZERO, &mat, &[], Vec3::UP);
        assert!(dark.approx_eq(Vec3::ZERO, 0.0));
        let unlit = shade(Vec3::UP, Vec3::ZERO, &mat, &[], Vec3::UP);
        assert!(unlit.approx_eq(mat.color, 0.0));
    }

    #[test]
    fn test_unnormalized_normal_is_normalized() {
        let mat = Material { color: Vec3::ONE, ka: 0.0, kd: 1.0, ks: 0.0, shininess: 1.0 };
        let light = [white_light(Vec3::new(0.0, 3.0, 0.0))];
        let a = compute_lighting(Vec3::new(0.0, 7.0, 0.0), Vec3::ZERO, &mat, &light, Vec3::UP);
        assert!(a.approx_eq(Vec3::ONE, 1e-12));
    }
}
