use glam::Vec3;
use rerun::{RecordingStream, TimeCell};

use crate::projection::SURFACE_HALF_EXTENT;
use crate::registry::MarkerRegistry;
use crate::session::FrameOutcome;
use crate::util::id_to_color;

fn to_points(points: &[Vec3]) -> Vec<[f32; 3]> {
    points.iter().map(|p| p.to_array()).collect()
}

/// Logs markers, the reconstructed surface and gaze hits to a rerun recording.
pub struct SurfaceRecorder {
    recording: RecordingStream,
    registry: MarkerRegistry,
    scale_calibration: f32,
}

impl SurfaceRecorder {
    pub fn save(
        path: &str,
        registry: MarkerRegistry,
        scale_calibration: f32,
    ) -> Result<SurfaceRecorder, Box<dyn std::error::Error>> {
        let recording = rerun::RecordingStreamBuilder::new("tabletop-gaze").save(path)?;
        Ok(SurfaceRecorder {
            recording,
            registry,
            scale_calibration,
        })
    }

    pub fn log_frame(&self, outcome: &FrameOutcome) -> Result<(), Box<dyn std::error::Error>> {
        let time_ns = (outcome.timestamp * 1e9) as i64;
        self.recording
            .set_time("stable", TimeCell::from_timestamp_nanos_since_epoch(time_ns));

        let (positions, colors_labels): (Vec<_>, Vec<_>) = outcome
            .observations
            .iter()
            .map(|o| {
                let color = match self.registry.get(o.id) {
                    Some(m) => (m.color[0], m.color[1], m.color[2], 255),
                    None => id_to_color(o.id as usize),
                };
                (o.position * self.scale_calibration, (color, format!("{}", o.id)))
            })
            .unzip();
        let (colors, labels): (Vec<_>, Vec<_>) = colors_labels.into_iter().unzip();
        self.recording.log(
            "world/markers",
            &rerun::Points3D::new(to_points(&positions))
                .with_colors(colors)
                .with_labels(labels)
                .with_radii([rerun::Radius::new_ui_points(5.0)]),
        )?;

        let s = &outcome.surface;
        let e = SURFACE_HALF_EXTENT;
        let outline = [
            s.transform_point(Vec3::new(-e, 0.0, e)),
            s.transform_point(Vec3::new(e, 0.0, e)),
            s.transform_point(Vec3::new(e, 0.0, -e)),
            s.transform_point(Vec3::new(-e, 0.0, -e)),
            s.transform_point(Vec3::new(-e, 0.0, e)),
        ];
        self.recording.log(
            "world/surface/outline",
            &rerun::LineStrips3D::new([to_points(&outline)]),
        )?;
        let axes = [s.right(), s.up(), s.forward()];
        self.recording.log(
            "world/surface/axes",
            &rerun::Arrows3D::from_vectors(to_points(&axes))
                .with_origins(to_points(&[s.position; 3]))
                .with_colors([(255, 0, 0, 255), (0, 255, 0, 255), (0, 0, 255, 255)]),
        )?;

        if let Some(hit) = outcome.hit {
            let world = s.transform_point(Vec3::new(hit.x, 0.0, hit.y));
            self.recording.log(
                "world/gaze",
                &rerun::Points3D::new(to_points(&[world]))
                    .with_colors([(255, 255, 255, 255)])
                    .with_radii([rerun::Radius::new_ui_points(8.0)]),
            )?;
        } else {
            self.recording.log("world/gaze", &rerun::Clear::flat())?;
        }
        Ok(())
    }
}
