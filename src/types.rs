use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A marker pose reported by the detector for a single frame.
///
/// `position` is in the detector's length unit (meters) and camera-aligned
/// world axes; `orientation` maps marker-local axes to world axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerObservation {
    pub id: u32,
    pub position: Vec3,
    pub orientation: Quat,
}

impl MarkerObservation {
    pub fn new(id: u32, position: Vec3, orientation: Quat) -> MarkerObservation {
        MarkerObservation {
            id,
            position,
            orientation,
        }
    }
}

/// One eye-tracker sample. `gaze` is normalized to [0, 1]², (0, 0) is the
/// top-left corner of the scene camera image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    pub timestamp: f64,
    pub gaze: Vec2,
}

impl GazeSample {
    pub fn new(timestamp: f64, gaze: Vec2) -> GazeSample {
        GazeSample { timestamp, gaze }
    }
}

/// Gaze position on the surface in physical units, one per projected frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalGazePoint {
    pub timestamp: f64,
    pub x_cm: f32,
    pub y_cm: f32,
}

/// Wall time spent in each pipeline stage, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimings {
    pub detection: f64,
    pub pose_update: f64,
    pub gaze_lookup: f64,
    pub projection: f64,
}

impl StageTimings {
    pub fn total(&self) -> f64 {
        self.detection + self.pose_update + self.gaze_lookup + self.projection
    }

    pub fn accumulate(&mut self, other: &StageTimings) {
        self.detection += other.detection;
        self.pose_update += other.pose_update;
        self.gaze_lookup += other.gaze_lookup;
        self.projection += other.projection;
    }
}

/// Which orientation recovery ran during a pose update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseStrategy {
    RotationAveraging,
    PlaneReconstruction,
}
