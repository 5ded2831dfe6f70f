use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::{Quat, Vec2, Vec3};
use tabletop_gaze::camera::Camera;
use tabletop_gaze::config::{CameraConfig, EstimatorConfig, ProjectorConfig};
use tabletop_gaze::gaze_index::TemporalGazeIndex;
use tabletop_gaze::projection::GazeProjector;
use tabletop_gaze::registry::MarkerRegistry;
use tabletop_gaze::surface::{SurfacePoseEstimator, SurfaceTransform};
use tabletop_gaze::synthetic::SyntheticTable;
use tabletop_gaze::types::GazeSample;
use tabletop_gaze::util::look_rotation;

fn table() -> SyntheticTable {
    let mut surface = SurfaceTransform::new(Vec2::new(1.2, 0.8));
    surface.position = Vec3::new(0.2, -0.5, 4.0);
    surface.orientation = Quat::from_rotation_y(0.4) * Quat::from_rotation_x(-0.2);
    SyntheticTable::new(MarkerRegistry::grid(3, 4, 0, 0.5), surface, 50.0)
}

fn bench_gaze_index(c: &mut Criterion) {
    // 120 Hz gaze against 30 Hz frames
    let samples: Vec<GazeSample> = (0..36_000)
        .map(|i| GazeSample::new(i as f64 / 120.0, Vec2::splat(0.5)))
        .collect();
    let frames: Vec<f64> = (0..9_000).map(|i| i as f64 / 30.0).collect();

    c.bench_function("gaze_index_monotonic_5min", |b| {
        b.iter(|| {
            let mut index = TemporalGazeIndex::new(samples.clone()).unwrap();
            for t in &frames {
                black_box(index.nearest(black_box(*t)));
            }
        })
    });
}

fn bench_pose_update(c: &mut Criterion) {
    let table = table();
    let all = table.noisy_observations(0.0005, 1);
    let two = table.observe(&[0, 5]);
    let mut estimator = SurfacePoseEstimator::new(
        table.registry.clone(),
        table.surface.dimensions(),
        table.scale_calibration,
        EstimatorConfig::default(),
    );

    c.bench_function("pose_update_plane_reconstruction", |b| {
        b.iter(|| estimator.update(black_box(&all)))
    });
    c.bench_function("pose_update_rotation_averaging", |b| {
        b.iter(|| estimator.update(black_box(&two)))
    });
}

fn bench_projection(c: &mut Criterion) {
    let table = table();
    let position = Vec3::new(0.0, 5.0, -6.0);
    let camera = Camera::new(
        &CameraConfig {
            position,
            orientation: look_rotation(table.surface.position - position, Vec3::Y).unwrap(),
            ..CameraConfig::default()
        },
        1920,
        1080,
    );
    let projector = GazeProjector::new(&ProjectorConfig::default());
    let gaze = table.gaze_at(Vec2::new(1.0, -1.0), &camera).unwrap();

    c.bench_function("gaze_projection", |b| {
        b.iter(|| projector.project(black_box(gaze), &table.surface, &camera))
    });
}

criterion_group!(benches, bench_gaze_index, bench_pose_update, bench_projection);
criterion_main!(benches);
