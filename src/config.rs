use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::registry::MarkerConfig;

/// The physical table: its markers, its size and the calibration factor
/// between detector lengths and world units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub markers: Vec<MarkerConfig>,
    /// Width and depth of the surface in meters.
    pub surface_dimensions: Vec2,
    /// Multiplier applied to detected marker positions. Lower values make the
    /// table appear closer to the camera.
    pub scale_calibration: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            markers: vec![
                MarkerConfig::new(0, Vec3::new(-4.5, 0.0, 4.5)),
                MarkerConfig::new(1, Vec3::new(4.5, 0.0, 4.5)),
                MarkerConfig::new(2, Vec3::new(-4.5, 0.0, -4.5)),
                MarkerConfig::new(3, Vec3::new(4.5, 0.0, -4.5)),
            ],
            surface_dimensions: Vec2::new(1.2, 0.8),
            scale_calibration: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Expected frame width and height in pixels.
    pub resolution: [u32; 2],
    /// Downscale factor applied before tag detection.
    pub decimation: u32,
    /// Edge length of the printed markers in meters.
    pub marker_size: f32,
    /// One of "t16h5", "t25h7", "t25h9", "t36h11", "t36h11b1".
    pub tag_family: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            resolution: [1920, 1080],
            decimation: 1,
            marker_size: 0.05,
            tag_family: "t36h11".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Blend rate of the orientation low-pass filter, per second.
    pub smoothing_rate: f32,
    /// Tolerance for coordinate ties and collinearity of reference markers.
    pub collinear_epsilon: f32,
    /// Frame time used by `SurfacePoseEstimator::update`, in seconds.
    pub frame_interval: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            smoothing_rate: 10.0,
            collinear_epsilon: 1e-5,
            frame_interval: 1.0 / 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub orientation: Quat,
    pub vertical_fov_deg: f32,
    pub near_clip: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            vertical_fov_deg: 60.0,
            near_clip: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    /// Collision layer the surface collider lives on.
    pub surface_layer: u32,
    /// Ray length limit; unbounded when absent.
    pub max_distance: Option<f32>,
    pub hit_backfaces: bool,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            surface_layer: 8,
            max_distance: None,
            hit_backfaces: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub table: TableConfig,
    pub detector: DetectorConfig,
    pub estimator: EstimatorConfig,
    pub camera: CameraConfig,
    pub projector: ProjectorConfig,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(Error::InvalidConfig(msg.to_string()));
        let dims = self.table.surface_dimensions;
        if !(dims.x > 0.0 && dims.y > 0.0) {
            return invalid("surface_dimensions must be positive");
        }
        if !(self.table.scale_calibration > 0.0) {
            return invalid("scale_calibration must be positive");
        }
        if !(self.detector.marker_size > 0.0) {
            return invalid("marker_size must be positive");
        }
        if self.detector.decimation == 0 {
            return invalid("decimation must be at least 1");
        }
        if self.detector.resolution.iter().any(|&r| r == 0) {
            return invalid("resolution must be non-zero");
        }
        if !(self.camera.vertical_fov_deg > 0.0 && self.camera.vertical_fov_deg < 180.0) {
            return invalid("vertical_fov_deg must be in (0, 180)");
        }
        if self.projector.surface_layer >= 32 {
            return invalid("surface_layer must be below 32");
        }
        let mut seen = HashSet::new();
        for m in &self.table.markers {
            if !seen.insert(m.id) {
                return Err(Error::DuplicateMarkerId(m.id));
            }
        }
        Ok(())
    }
}
