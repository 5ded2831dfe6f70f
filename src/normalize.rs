use glam::Vec2;

use crate::projection::SURFACE_HALF_EXTENT;

/// Factor from surface dimensions (meters) to logged output units.
pub const PHYSICAL_SCALE: f32 = 1000.0;

/// Maps surface-local coordinates (nominally [-5, 5]²) to physical
/// coordinates on a surface of `dimensions`. Inputs outside the nominal range
/// extrapolate past the surface edge; nothing is clamped.
pub fn to_physical(local: Vec2, dimensions: Vec2) -> Vec2 {
    let unit = (local + Vec2::splat(SURFACE_HALF_EXTENT)) / (2.0 * SURFACE_HALF_EXTENT);
    unit * dimensions * PHYSICAL_SCALE
}
