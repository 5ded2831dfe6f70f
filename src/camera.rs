use glam::{Quat, Vec2, Vec3};

use crate::config::CameraConfig;
use crate::projection::Ray;

/// Perspective scene camera. Looks along its local +Z with +Y up; pixel
/// coordinates have their origin in the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    pub vertical_fov_deg: f32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub near_clip: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig, pixel_width: u32, pixel_height: u32) -> Camera {
        Camera {
            position: config.position,
            orientation: config.orientation,
            vertical_fov_deg: config.vertical_fov_deg,
            pixel_width,
            pixel_height,
            near_clip: config.near_clip,
        }
    }

    /// Focal length in pixels implied by the vertical field of view.
    pub fn focal_px(&self) -> f32 {
        (self.pixel_height as f32 / 2.0) / (self.vertical_fov_deg.to_radians() / 2.0).tan()
    }

    pub fn principal_point(&self) -> Vec2 {
        Vec2::new(self.pixel_width as f32 / 2.0, self.pixel_height as f32 / 2.0)
    }

    pub fn pixel_from_normalized(&self, normalized: Vec2) -> Vec2 {
        Vec2::new(
            normalized.x * self.pixel_width as f32,
            normalized.y * self.pixel_height as f32,
        )
    }

    /// Ray from the near clip plane through `pixel`, in world space.
    pub fn screen_point_to_ray(&self, pixel: Vec2) -> Ray {
        let offset = (pixel - self.principal_point()) / self.focal_px();
        let local = Vec3::new(offset.x, -offset.y, 1.0);
        let direction = (self.orientation * local).normalize();
        let origin = self.position + self.orientation * (local * self.near_clip);
        Ray::new(origin, direction)
    }

    /// Pixel where a world point appears, `None` behind the camera.
    pub fn world_to_screen_point(&self, point: Vec3) -> Option<Vec2> {
        let local = self.orientation.inverse() * (point - self.position);
        if local.z <= f32::EPSILON {
            return None;
        }
        let f = self.focal_px();
        Some(self.principal_point() + Vec2::new(local.x / local.z, -local.y / local.z) * f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default(), 1920, 1080)
    }

    #[test]
    fn center_ray_is_forward() {
        let cam = camera();
        let ray = cam.screen_point_to_ray(Vec2::new(960.0, 540.0));
        assert!((ray.direction - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn top_of_image_looks_up() {
        let cam = camera();
        let ray = cam.screen_point_to_ray(Vec2::new(960.0, 0.0));
        assert!(ray.direction.y > 0.0);
        let half_fov = ray.direction.y.atan2(ray.direction.z).to_degrees();
        assert!((half_fov - 30.0).abs() < 1e-3);
    }

    #[test]
    fn world_to_screen_inverts_ray() {
        let mut cam = camera();
        cam.position = Vec3::new(0.3, 2.0, -1.0);
        cam.orientation = Quat::from_rotation_x(0.6);
        let pixel = Vec2::new(400.0, 800.0);
        let ray = cam.screen_point_to_ray(pixel);
        let back = cam.world_to_screen_point(ray.at(5.0)).unwrap();
        assert!((back - pixel).length() < 1e-2);
    }
}
