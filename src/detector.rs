use aprilgrid::TagFamily;
use aprilgrid::detector::TagDetector;
use glam::{Quat, Vec2, Vec3};
use image::DynamicImage;
use image::imageops::FilterType;
use sqpnp_simple::sqpnp_solve_glam;

use crate::camera::Camera;
use crate::config::DetectorConfig;
use crate::error::{Error, Result};
use crate::types::MarkerObservation;

/// Maps a pixel-center coordinate of a resized image back to the image it was
/// resized from; `scale` is original size over resized size per axis.
fn to_full_resolution(p: (f32, f32), scale: Vec2) -> Vec2 {
    (Vec2::new(p.0, p.1) + Vec2::splat(0.5)) * scale - Vec2::splat(0.5)
}

/// Source of per-frame marker poses.
pub trait MarkerDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<MarkerObservation>>;
}

impl<F> MarkerDetector for F
where
    F: Fn(&DynamicImage) -> Result<Vec<MarkerObservation>>,
{
    fn detect(&self, image: &DynamicImage) -> Result<Vec<MarkerObservation>> {
        self(image)
    }
}

pub fn tag_family_from_str(name: &str) -> Result<TagFamily> {
    match name.to_ascii_lowercase().as_str() {
        "t16h5" => Ok(TagFamily::T16H5),
        "t25h7" => Ok(TagFamily::T25H7),
        "t25h9" => Ok(TagFamily::T25H9),
        "t36h11" => Ok(TagFamily::T36H11),
        "t36h11b1" => Ok(TagFamily::T36H11B1),
        _ => Err(Error::UnknownTagFamily(name.to_string())),
    }
}

/// AprilTag detection followed by a per-tag PnP pose solve.
pub struct AprilTagDetector {
    detector: TagDetector,
    resolution: [u32; 2],
    decimation: u32,
    marker_size: f32,
    focal_px: f32,
    principal_point: Vec2,
}

impl AprilTagDetector {
    pub fn new(config: &DetectorConfig, camera: &Camera) -> Result<AprilTagDetector> {
        let family = tag_family_from_str(&config.tag_family)?;
        if config.decimation == 0 {
            return Err(Error::InvalidConfig("decimation must be at least 1".to_string()));
        }
        Ok(AprilTagDetector {
            detector: TagDetector::new(&family, None),
            resolution: config.resolution,
            decimation: config.decimation,
            marker_size: config.marker_size,
            focal_px: camera.focal_px(),
            principal_point: camera.principal_point(),
        })
    }

    /// Pose of one tag from its four corners (top-left, top-right,
    /// bottom-right, bottom-left) in full-resolution pixels.
    fn solve_pose(&self, id: u32, corners: &[Vec2]) -> Option<MarkerObservation> {
        if corners.len() != 4 {
            return None;
        }
        let h = self.marker_size / 2.0;
        // y-down tag frame, so the tag's +Z points into the table
        let p3ds = vec![
            Vec3::new(-h, -h, 0.0),
            Vec3::new(h, -h, 0.0),
            Vec3::new(h, h, 0.0),
            Vec3::new(-h, h, 0.0),
        ];
        let p2ds_z: Vec<Vec2> = corners
            .iter()
            .map(|p| (*p - self.principal_point) / self.focal_px)
            .collect();
        let (rvec, tvec) = sqpnp_solve_glam(&p3ds, &p2ds_z)?;

        let r_cv = Quat::from_scaled_axis(Vec3::new(rvec.0 as f32, rvec.1 as f32, rvec.2 as f32));
        // solver frame is y-down, world frame is y-up: mirror y on both sides
        let orientation = Quat::from_xyzw(-r_cv.x, r_cv.y, -r_cv.z, r_cv.w).normalize();
        let position = Vec3::new(tvec.0 as f32, -tvec.1 as f32, tvec.2 as f32);
        if !position.is_finite() || !orientation.is_finite() {
            return None;
        }
        Some(MarkerObservation::new(id, position, orientation))
    }
}

impl MarkerDetector for AprilTagDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<MarkerObservation>> {
        let (w, h) = (image.width(), image.height());
        if [w, h] != self.resolution {
            return Err(Error::ResolutionMismatch {
                got_w: w,
                got_h: h,
                want_w: self.resolution[0],
                want_h: self.resolution[1],
            });
        }
        let decimated;
        let input = if self.decimation > 1 {
            decimated = image.resize_exact(
                (w / self.decimation).max(1),
                (h / self.decimation).max(1),
                FilterType::Triangle,
            );
            &decimated
        } else {
            image
        };
        let scale = Vec2::new(
            w as f32 / input.width() as f32,
            h as f32 / input.height() as f32,
        );

        let detected_tags = self.detector.detect(input);
        let mut observations: Vec<MarkerObservation> = detected_tags
            .iter()
            .filter_map(|(id, corners)| {
                let pixels: Vec<Vec2> = corners
                    .iter()
                    .map(|p| to_full_resolution(*p, scale))
                    .collect();
                self.solve_pose(*id, &pixels)
            })
            .collect();
        observations.sort_by_key(|o| o.id);
        log::trace!("detected {} tags", observations.len());
        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::surface::MARKER_UP;

    fn detector() -> (AprilTagDetector, Camera) {
        let camera = Camera::new(&CameraConfig::default(), 1920, 1080);
        let detector = AprilTagDetector::new(&DetectorConfig::default(), &camera).unwrap();
        (detector, camera)
    }

    /// Image corners of a tag at `position`/`orientation`, in detector order.
    fn tag_corners(camera: &Camera, size: f32, position: Vec3, orientation: Quat) -> Vec<Vec2> {
        let h = size / 2.0;
        // top-left, top-right, bottom-right, bottom-left as printed
        [(-h, h), (h, h), (h, -h), (-h, -h)]
            .iter()
            .map(|(x, y)| {
                let world = position + orientation * Vec3::new(*x, *y, 0.0);
                camera.world_to_screen_point(world).unwrap()
            })
            .collect()
    }

    #[test]
    fn solve_pose_recovers_tag_pose() {
        let (detector, camera) = detector();
        let position = Vec3::new(0.1, -0.2, 0.8);
        let orientation = Quat::from_rotation_y(0.4) * Quat::from_rotation_x(-0.6);
        let corners = tag_corners(&camera, detector.marker_size, position, orientation);

        let obs = detector.solve_pose(7, &corners).unwrap();
        assert_eq!(obs.id, 7);
        assert!((obs.position - position).length() < 1e-3, "{}", obs.position);
        assert!(obs.orientation.angle_between(orientation) < 1e-3);

        let normal = obs.orientation * MARKER_UP;
        assert!((normal - orientation * MARKER_UP).length() < 1e-3);
        // the printed face looks back at the camera
        assert!(normal.dot(-obs.position) > 0.0);
    }

    #[test]
    fn solve_pose_tag_below_camera() {
        let (detector, camera) = detector();
        // lying on a table below and in front of the camera, top edge away
        let position = Vec3::new(-0.05, -0.4, 1.2);
        let orientation = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2 - 0.2);
        let corners = tag_corners(&camera, detector.marker_size, position, orientation);

        let obs = detector.solve_pose(0, &corners).unwrap();
        assert!((obs.position - position).length() < 1e-3);
        assert!(obs.orientation.angle_between(orientation) < 1e-3);
        assert!((obs.orientation * MARKER_UP).y > 0.0);
    }

    #[test]
    fn solve_pose_needs_four_corners() {
        let (detector, _) = detector();
        assert!(detector.solve_pose(0, &[Vec2::ZERO; 3]).is_none());
    }

    #[test]
    fn full_resolution_mapping() {
        let p = to_full_resolution((10.0, 20.0), Vec2::ONE);
        assert!((p - Vec2::new(10.0, 20.0)).length() < 1e-6);

        // first pixel center of a 2x decimated image covers full pixels 0 and 1
        let p = to_full_resolution((0.0, 0.0), Vec2::splat(2.0));
        assert!((p - Vec2::splat(0.5)).length() < 1e-6);

        // 1920 / 7 floors to 274; the right edge maps to the right edge
        let scale = Vec2::new(1920.0 / 274.0, 1080.0 / 154.0);
        let p = to_full_resolution((273.5, 153.5), scale);
        assert!((p - Vec2::new(1919.5, 1079.5)).length() < 1e-3);
    }
}
