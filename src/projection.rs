use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::config::ProjectorConfig;
use crate::surface::SurfaceTransform;

/// Half edge length of the surface collider in surface-local units.
pub const SURFACE_HALF_EXTENT: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Ray {
        Ray { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Hit point in world space.
    pub point: Vec3,
    pub distance: f32,
    /// Hit point in the collider's local frame.
    pub local_point: Vec3,
    pub layer: u32,
}

/// Set of collision layers a raycast considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn only(layer: u32) -> LayerMask {
        LayerMask(1u32.checked_shl(layer).unwrap_or(0))
    }

    pub fn contains(&self, layer: u32) -> bool {
        self.0 & LayerMask::only(layer).0 != 0
    }
}

pub trait Collider {
    fn layer(&self) -> u32;
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit>;
}

/// Bounded plane `y = 0`, `|x|, |z| <= half_extent` in the local frame of a
/// surface transform. Only the +Y face is hit unless `hit_backfaces` is set.
#[derive(Debug, Clone, Copy)]
pub struct PlaneCollider {
    pub transform: SurfaceTransform,
    pub half_extent: f32,
    pub layer: u32,
    pub hit_backfaces: bool,
}

impl PlaneCollider {
    pub fn for_surface(transform: SurfaceTransform, layer: u32) -> PlaneCollider {
        PlaneCollider {
            transform,
            half_extent: SURFACE_HALF_EXTENT,
            layer,
            hit_backfaces: false,
        }
    }
}

impl Collider for PlaneCollider {
    fn layer(&self) -> u32 {
        self.layer
    }

    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        let origin = self.transform.inverse_transform_point(ray.origin);
        let direction = self.transform.inverse_transform_direction(ray.direction);
        if direction.y.abs() < f32::EPSILON {
            return None;
        }
        if direction.y > 0.0 && !self.hit_backfaces {
            return None;
        }
        // the local map is affine, so t is the same in world space
        let t = -origin.y / direction.y;
        if t < 0.0 {
            return None;
        }
        let distance = t * ray.direction.length();
        if distance > max_distance {
            return None;
        }
        let local_point = origin + direction * t;
        let bound = self.half_extent + 1e-4;
        if local_point.x.abs() > bound || local_point.z.abs() > bound {
            return None;
        }
        Some(RaycastHit {
            point: ray.at(t),
            distance,
            local_point: Vec3::new(local_point.x, 0.0, local_point.z),
            layer: self.layer,
        })
    }
}

/// Nearest hit among colliders on layers in `mask`.
pub fn raycast(
    colliders: &[&dyn Collider],
    ray: &Ray,
    max_distance: f32,
    mask: LayerMask,
) -> Option<RaycastHit> {
    colliders
        .iter()
        .filter(|c| mask.contains(c.layer()))
        .filter_map(|c| c.raycast(ray, max_distance))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Casts gaze rays from the scene camera onto the surface.
#[derive(Debug, Clone)]
pub struct GazeProjector {
    surface_layer: u32,
    mask: LayerMask,
    max_distance: f32,
    hit_backfaces: bool,
}

impl GazeProjector {
    pub fn new(config: &ProjectorConfig) -> GazeProjector {
        GazeProjector {
            surface_layer: config.surface_layer,
            mask: LayerMask::only(config.surface_layer),
            max_distance: config.max_distance.unwrap_or(f32::INFINITY),
            hit_backfaces: config.hit_backfaces,
        }
    }

    pub fn surface_collider(&self, surface: &SurfaceTransform) -> PlaneCollider {
        PlaneCollider {
            hit_backfaces: self.hit_backfaces,
            ..PlaneCollider::for_surface(*surface, self.surface_layer)
        }
    }

    pub fn gaze_ray(&self, gaze: Vec2, camera: &Camera) -> Ray {
        camera.screen_point_to_ray(camera.pixel_from_normalized(gaze))
    }

    /// Surface-local (x, z) of the point the gaze lands on, `None` when the
    /// ray misses the surface.
    pub fn project(&self, gaze: Vec2, surface: &SurfaceTransform, camera: &Camera) -> Option<Vec2> {
        let collider = self.surface_collider(surface);
        self.project_in_scene(gaze, camera, &[&collider])
    }

    /// Like `project`, against an arbitrary collider set filtered by the
    /// surface layer mask.
    pub fn project_in_scene(
        &self,
        gaze: Vec2,
        camera: &Camera,
        colliders: &[&dyn Collider],
    ) -> Option<Vec2> {
        let ray = self.gaze_ray(gaze, camera);
        let hit = raycast(colliders, &ray, self.max_distance, self.mask)?;
        Some(Vec2::new(hit.local_point.x, hit.local_point.z))
    }
}
