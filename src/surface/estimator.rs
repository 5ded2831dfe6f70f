use glam::{Quat, Vec2, Vec3};
use log::{debug, trace};

use super::transform::SurfaceTransform;
use crate::config::{EstimatorConfig, SessionConfig};
use crate::error::Result;
use crate::registry::{MarkerRegistry, RegisteredMarker};
use crate::types::{MarkerObservation, PoseStrategy};
use crate::util::{approx_eq, look_rotation, project_on_plane, signed_angle_deg};

/// Marker-local face normal. The detector reports markers facing -Z.
pub const MARKER_UP: Vec3 = Vec3::NEG_Z;
/// Marker-local direction towards the top edge of the printed pattern.
pub const MARKER_FORWARD: Vec3 = Vec3::Y;
pub const WORLD_UP: Vec3 = Vec3::Y;

/// The three registered markers spanning the surface plane.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceMarkers<'a> {
    pub upper_left: &'a RegisteredMarker,
    pub upper_right: &'a RegisteredMarker,
    pub lower_left: &'a RegisteredMarker,
}

impl ReferenceMarkers<'_> {
    /// True when all three share an x or a z design coordinate.
    pub fn is_collinear(&self, eps: f32) -> bool {
        let (ul, ur, ll) = (
            self.upper_left.surface_offset,
            self.upper_right.surface_offset,
            self.lower_left.surface_offset,
        );
        let same_x = approx_eq(ul.x, ur.x, eps) && approx_eq(ul.x, ll.x, eps);
        let same_z = approx_eq(ul.z, ur.z, eps) && approx_eq(ul.z, ll.z, eps);
        same_x || same_z
    }
}

fn pick<'a>(
    candidates: &[&'a RegisteredMarker],
    primary: fn(&RegisteredMarker) -> f32,
    primary_max: bool,
    secondary: fn(&RegisteredMarker) -> f32,
    secondary_max: bool,
    eps: f32,
) -> Option<&'a RegisteredMarker> {
    let better = |a: f32, b: f32, max: bool| if max { a > b } else { a < b };
    let extreme = candidates
        .iter()
        .map(|m| primary(m))
        .reduce(|a, b| if better(b, a, primary_max) { b } else { a })?;
    candidates
        .iter()
        .copied()
        .filter(|m| approx_eq(primary(m), extreme, eps))
        .reduce(|a, b| {
            let (sa, sb) = (secondary(a), secondary(b));
            if better(sb, sa, secondary_max) && !approx_eq(sa, sb, eps) {
                b
            } else {
                a
            }
        })
}

fn offset_x(m: &RegisteredMarker) -> f32 {
    m.surface_offset.x
}

fn offset_z(m: &RegisteredMarker) -> f32 {
    m.surface_offset.z
}

/// Picks upper-left (max z, then min x), upper-right (max x, then max z) and
/// lower-left (min z, then min x), each from what the previous picks left.
pub fn select_reference_markers<'a>(
    visible: &[&'a RegisteredMarker],
    eps: f32,
) -> Option<ReferenceMarkers<'a>> {
    if visible.len() < 3 {
        return None;
    }
    let upper_left = pick(visible, offset_z, true, offset_x, false, eps)?;
    let rest: Vec<_> = visible
        .iter()
        .copied()
        .filter(|m| m.id != upper_left.id)
        .collect();
    let upper_right = pick(&rest, offset_x, true, offset_z, true, eps)?;
    let rest: Vec<_> = rest
        .into_iter()
        .filter(|m| m.id != upper_right.id)
        .collect();
    let lower_left = pick(&rest, offset_z, false, offset_x, false, eps)?;
    Some(ReferenceMarkers {
        upper_left,
        upper_right,
        lower_left,
    })
}

/// Tracks the table surface from per-frame marker detections.
///
/// The surface pose is sticky: frames without detections leave it where it
/// was last seen.
#[derive(Debug, Clone)]
pub struct SurfacePoseEstimator {
    registry: MarkerRegistry,
    surface: SurfaceTransform,
    config: EstimatorConfig,
    scale_calibration: f32,
    smoothed_up: Vec3,
    smoothed_forward: Vec3,
    last_strategy: Option<PoseStrategy>,
}

impl SurfacePoseEstimator {
    pub fn new(
        registry: MarkerRegistry,
        dimensions: Vec2,
        scale_calibration: f32,
        config: EstimatorConfig,
    ) -> SurfacePoseEstimator {
        SurfacePoseEstimator {
            registry,
            surface: SurfaceTransform::new(dimensions),
            config,
            scale_calibration,
            smoothed_up: Vec3::ZERO,
            smoothed_forward: Vec3::ZERO,
            last_strategy: None,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Result<SurfacePoseEstimator> {
        let registry = MarkerRegistry::new(&config.table.markers)?;
        Ok(Self::new(
            registry,
            config.table.surface_dimensions,
            config.table.scale_calibration,
            config.estimator.clone(),
        ))
    }

    /// Update with the configured nominal frame interval.
    pub fn update(&mut self, observations: &[MarkerObservation]) {
        self.update_with_elapsed(observations, self.config.frame_interval);
    }

    /// Orientation first, then position, since position recovery uses the
    /// surface basis. An empty observation set changes nothing.
    pub fn update_with_elapsed(&mut self, observations: &[MarkerObservation], dt: f32) {
        if observations.is_empty() {
            return;
        }
        let strategy = match self.reconstruct_plane(observations) {
            Some(orientation) => {
                self.surface.orientation = orientation;
                PoseStrategy::PlaneReconstruction
            }
            None => {
                self.average_rotations(observations, dt);
                PoseStrategy::RotationAveraging
            }
        };
        trace!("{} markers, {:?}", observations.len(), strategy);
        self.last_strategy = Some(strategy);
        self.recover_position(observations);
    }

    fn reconstruct_plane(&self, observations: &[MarkerObservation]) -> Option<Quat> {
        if observations.len() < 3 {
            return None;
        }
        let eps = self.config.collinear_epsilon;
        let visible: Vec<&RegisteredMarker> = self
            .registry
            .iter()
            .filter(|m| observations.iter().any(|o| o.id == m.id))
            .collect();
        let refs = select_reference_markers(&visible, eps)?;
        if refs.is_collinear(eps) {
            debug!(
                "reference markers {}, {}, {} lie on one line, averaging rotations",
                refs.upper_left.id, refs.upper_right.id, refs.lower_left.id
            );
            return None;
        }

        let physical = |id: u32| observations.iter().find(|o| o.id == id).map(|o| o.position);
        let upper_left = physical(refs.upper_left.id)?;
        let upper_right = physical(refs.upper_right.id)?;
        let lower_left = physical(refs.lower_left.id)?;

        let normal = (upper_right - upper_left).cross(lower_left - upper_left);
        if normal.try_normalize().is_none() {
            debug!("detected reference markers are collinear, averaging rotations");
            return None;
        }

        let dims = self.surface.dimensions();
        let design = |m: &RegisteredMarker| {
            Vec2::new(m.surface_offset.x * dims.x, m.surface_offset.z * dims.y)
        };
        let offset_angle = signed_angle_deg(
            design(refs.upper_left),
            design(refs.lower_left),
            Vec2::NEG_Y,
            -Vec2::X,
        );

        let forward = (project_on_plane(lower_left, normal) - project_on_plane(upper_left, normal))
            .try_normalize()?;
        let rotation = look_rotation(forward, normal)?;
        Some(rotation * Quat::from_axis_angle(Vec3::Y, (180.0 + offset_angle).to_radians()))
    }

    fn average_rotations(&mut self, observations: &[MarkerObservation], dt: f32) {
        let mut up_sum = Vec3::ZERO;
        let mut forward_sum = Vec3::ZERO;
        for o in observations {
            let mut up = o.orientation * MARKER_UP;
            let forward = o.orientation * MARKER_FORWARD;
            // the detector sometimes reports a marker flipped upside down.
            // World up is the only reference; no second flip against -Z.
            if up.dot(WORLD_UP) < 0.0 {
                up = -up;
            }
            up_sum += up;
            forward_sum += forward;
        }
        if up_sum == Vec3::ZERO && forward_sum == Vec3::ZERO {
            debug!("marker directions cancel out, keeping orientation");
            return;
        }

        let t = (dt * self.config.smoothing_rate).clamp(0.0, 1.0);
        self.smoothed_forward = self.smoothed_forward.lerp(forward_sum, t);
        self.smoothed_up = self.smoothed_up.lerp(up_sum, t);
        match look_rotation(self.smoothed_forward, self.smoothed_up) {
            Some(q) => self.surface.orientation = q,
            None => trace!("smoothed directions degenerate, keeping orientation"),
        }
    }

    fn recover_position(&mut self, observations: &[MarkerObservation]) {
        let mut sum = Vec3::ZERO;
        let mut count = 0usize;
        for o in observations {
            if let Some(m) = self.registry.get(o.id) {
                sum += o.position * self.scale_calibration
                    - self.surface.transform_vector(m.surface_offset);
                count += 1;
            }
        }
        if count == 0 {
            trace!("no registered marker visible, keeping position");
            return;
        }
        self.surface.position = sum / count as f32;
    }

    pub fn surface(&self) -> &SurfaceTransform {
        &self.surface
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn smoothed_up(&self) -> Vec3 {
        self.smoothed_up
    }

    pub fn smoothed_forward(&self) -> Vec3 {
        self.smoothed_forward
    }

    pub fn last_strategy(&self) -> Option<PoseStrategy> {
        self.last_strategy
    }

    pub fn scale_calibration(&self) -> f32 {
        self.scale_calibration
    }
}
