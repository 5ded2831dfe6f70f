use glam::{Quat, Vec2, Vec3};

/// World pose of the table surface. `local_scale` holds the physical width,
/// a unit height and the physical depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTransform {
    pub position: Vec3,
    pub orientation: Quat,
    pub local_scale: Vec3,
}

impl SurfaceTransform {
    pub fn new(dimensions: Vec2) -> SurfaceTransform {
        SurfaceTransform {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            local_scale: Vec3::new(dimensions.x, 1.0, dimensions.y),
        }
    }

    pub fn dimensions(&self) -> Vec2 {
        Vec2::new(self.local_scale.x, self.local_scale.z)
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// Offset from the surface origin to a surface-local point, in world axes.
    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        local.x * self.local_scale.x * self.right()
            + local.y * self.local_scale.y * self.up()
            + local.z * self.local_scale.z * self.forward()
    }

    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.transform_vector(local)
    }

    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        (self.orientation.inverse() * (world - self.position)) / self.local_scale
    }

    pub fn inverse_transform_direction(&self, world: Vec3) -> Vec3 {
        (self.orientation.inverse() * world) / self.local_scale
    }
}
