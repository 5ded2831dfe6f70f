use glam::{Mat3, Quat, Vec2, Vec3};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Rotation whose +Z axis points along `forward` and whose +Y axis is `up`
/// made orthogonal to it.
///
/// Returns `None` when `forward` is zero or parallel to `up`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let f = forward.try_normalize()?;
    let r = up.cross(f).try_normalize()?;
    let u = f.cross(r);
    Some(Quat::from_mat3(&Mat3::from_cols(r, u, f)).normalize())
}

pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    let sqr = normal.length_squared();
    if sqr < f32::EPSILON {
        return v;
    }
    v - normal * (v.dot(normal) / sqr)
}

/// Unsigned angle in degrees between two 2D directions, 0 if either is zero.
pub fn unsigned_angle_deg(from: Vec2, to: Vec2) -> f32 {
    let denom = (from.length_squared() * to.length_squared()).sqrt();
    if denom < 1e-15 {
        return 0.0;
    }
    (from.dot(to) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Angle in degrees from `from_direction` to the direction `a -> b`, negated
/// when that direction lies on the `side` half-plane.
pub fn signed_angle_deg(a: Vec2, b: Vec2, from_direction: Vec2, side: Vec2) -> f32 {
    let direction = (b - a).normalize_or_zero();
    let angle = unsigned_angle_deg(from_direction, direction);
    if direction.dot(-side) < 0.0 {
        -angle
    } else {
        angle
    }
}

pub fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

/// Stable pseudo-random color for ids without a configured one.
pub fn id_to_color(id: usize) -> (u8, u8, u8, u8) {
    let mut rng = ChaCha8Rng::seed_from_u64(id as u64);
    let color_num = rng.random_range(0..2u32.pow(24));
    (
        ((color_num >> 16) % 256) as u8,
        ((color_num >> 8) % 256) as u8,
        (color_num % 256) as u8,
        255,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_rotation_identity() {
        let q = look_rotation(Vec3::Z, Vec3::Y).unwrap();
        assert!(q.angle_between(Quat::IDENTITY) < 1e-5);
    }

    #[test]
    fn look_rotation_degenerate() {
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
        assert!(look_rotation(Vec3::Y, Vec3::Y * 2.0).is_none());
    }

    #[test]
    fn look_rotation_axes() {
        let forward = Vec3::new(1.0, 0.0, 1.0);
        let up = Vec3::new(0.0, 1.0, 0.3);
        let q = look_rotation(forward, up).unwrap();
        assert!((q * Vec3::Z - forward.normalize()).length() < 1e-5);
        assert!((q * Vec3::Y).dot(up) > 0.0);
        assert!((q * Vec3::Y).dot(q * Vec3::Z).abs() < 1e-5);
    }

    #[test]
    fn signed_angle_sides() {
        let a = Vec2::ZERO;
        let down = Vec2::new(0.0, -1.0);
        assert!(signed_angle_deg(a, down, down, -Vec2::X).abs() < 1e-4);
        let right_down = Vec2::new(1.0, -1.0);
        assert!((signed_angle_deg(a, right_down, down, -Vec2::X) - 45.0).abs() < 1e-3);
        let left_down = Vec2::new(-1.0, -1.0);
        assert!((signed_angle_deg(a, left_down, down, -Vec2::X) + 45.0).abs() < 1e-3);
    }
}
