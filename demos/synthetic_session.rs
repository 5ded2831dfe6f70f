use glam::{Quat, Vec2, Vec3};
use image::DynamicImage;
use tabletop_gaze::camera::Camera;
use tabletop_gaze::config::SessionConfig;
use tabletop_gaze::data_loader::Frame;
use tabletop_gaze::io::GazePointWriter;
use tabletop_gaze::registry::MarkerRegistry;
use tabletop_gaze::session::Session;
use tabletop_gaze::surface::SurfaceTransform;
use tabletop_gaze::synthetic::SyntheticTable;
use tabletop_gaze::types::{GazeSample, MarkerObservation};
use tabletop_gaze::util::look_rotation;
use tabletop_gaze::visualization::SurfaceRecorder;

const FPS: f64 = 30.0;
const FRAMES: usize = 90;

/// Table drifting and turning slowly in front of a fixed camera.
fn table_at(config: &SessionConfig, t: f32) -> SyntheticTable {
    let mut surface = SurfaceTransform::new(config.table.surface_dimensions);
    surface.position = Vec3::new(0.5 * t, -0.2, 1.0 + 0.3 * t);
    surface.orientation = Quat::from_rotation_y(0.4 * t) * Quat::from_rotation_x(0.1);
    SyntheticTable::new(
        MarkerRegistry::new(&config.table.markers).unwrap(),
        surface,
        config.table.scale_calibration,
    )
}

fn main() {
    env_logger::init();
    let mut config = SessionConfig::default();
    config.camera.position = Vec3::new(0.0, 7.0, -9.0);
    config.camera.orientation = look_rotation(-config.camera.position, Vec3::Y).unwrap();
    let [w, h] = config.detector.resolution;
    let camera = Camera::new(&config.camera, w, h);

    // gaze circles around the table center, sampled at 4x the frame rate
    let mut samples = Vec::new();
    let mut observations: Vec<Vec<MarkerObservation>> = Vec::new();
    for i in 0..FRAMES * 4 {
        let t = i as f64 / (FPS * 4.0);
        let table = table_at(&config, t as f32);
        let angle = t as f32 * 2.0;
        let local = Vec2::new(angle.cos(), angle.sin()) * 3.0;
        if let Some(gaze) = table.gaze_at(local, &camera) {
            samples.push(GazeSample::new(t, gaze));
        }
        if i % 4 == 0 {
            let frame = i / 4;
            // markers 2 and 3 drop out for a while, then everything vanishes
            let visible = match frame {
                0..30 => table.noisy_observations(0.0005, frame as u64),
                30..60 => table.observe(&[0, 1]),
                _ => Vec::new(),
            };
            observations.push(visible);
        }
    }

    let recorder = SurfaceRecorder::save(
        "synthetic_session.rrd",
        MarkerRegistry::new(&config.table.markers).unwrap(),
        config.table.scale_calibration,
    )
    .ok();

    let frame_ids = std::cell::Cell::new(0usize);
    let detector = |_image: &DynamicImage| -> tabletop_gaze::Result<Vec<MarkerObservation>> {
        let idx = frame_ids.get();
        frame_ids.set(idx + 1);
        Ok(observations.get(idx).cloned().unwrap_or_default())
    };
    let mut session = Session::new(&config, detector, camera, samples).unwrap();
    let frames = (0..FRAMES).map(|i| {
        Ok(Frame {
            timestamp: i as f64 / FPS,
            image: DynamicImage::new_luma8(1, 1),
        })
    });

    let mut writer = GazePointWriter::new(std::io::stdout());
    let summary = session
        .run(frames, &mut writer, |outcome| {
            if let Some(recorder) = &recorder {
                recorder.log_frame(outcome).unwrap();
            }
        })
        .unwrap();
    println!("{}", serde_json::to_string_pretty(&summary).unwrap());
}
