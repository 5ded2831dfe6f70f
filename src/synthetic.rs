//! Synthetic tables for tests, benches and demos: markers placed exactly on a
//! known surface pose, seen by a known camera.

use glam::{Quat, Vec2, Vec3};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::f32::consts::FRAC_PI_2;

use crate::camera::Camera;
use crate::registry::MarkerRegistry;
use crate::surface::SurfaceTransform;
use crate::types::MarkerObservation;

/// Orientation a marker lying flat on a surface with `surface_orientation`
/// is reported with.
pub fn marker_orientation_on(surface_orientation: Quat) -> Quat {
    surface_orientation * Quat::from_rotation_x(FRAC_PI_2)
}

#[derive(Debug, Clone)]
pub struct SyntheticTable {
    pub registry: MarkerRegistry,
    pub surface: SurfaceTransform,
    pub scale_calibration: f32,
}

impl SyntheticTable {
    pub fn new(
        registry: MarkerRegistry,
        surface: SurfaceTransform,
        scale_calibration: f32,
    ) -> SyntheticTable {
        SyntheticTable {
            registry,
            surface,
            scale_calibration,
        }
    }

    /// Detector output when every registered marker is visible.
    pub fn observations(&self) -> Vec<MarkerObservation> {
        let ids: Vec<u32> = self.registry.iter().map(|m| m.id).collect();
        self.observe(&ids)
    }

    /// Detector output for the given ids; unknown ids are skipped.
    pub fn observe(&self, ids: &[u32]) -> Vec<MarkerObservation> {
        let orientation = marker_orientation_on(self.surface.orientation);
        ids.iter()
            .filter_map(|id| self.registry.get(*id))
            .map(|m| {
                let world = self.surface.transform_point(m.surface_offset);
                MarkerObservation::new(m.id, world / self.scale_calibration, orientation)
            })
            .collect()
    }

    /// Observations with uniform position noise of `amplitude` (detector units).
    pub fn noisy_observations(&self, amplitude: f32, seed: u64) -> Vec<MarkerObservation> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.observations()
            .into_iter()
            .map(|mut o| {
                o.position += Vec3::new(
                    rng.random_range(-amplitude..=amplitude),
                    rng.random_range(-amplitude..=amplitude),
                    rng.random_range(-amplitude..=amplitude),
                );
                o
            })
            .collect()
    }

    /// Normalized gaze that lands on surface-local `(x, z)`.
    pub fn gaze_at(&self, local: Vec2, camera: &Camera) -> Option<Vec2> {
        let world = self.surface.transform_point(Vec3::new(local.x, 0.0, local.y));
        let pixel = camera.world_to_screen_point(world)?;
        Some(pixel / Vec2::new(camera.pixel_width as f32, camera.pixel_height as f32))
    }
}
