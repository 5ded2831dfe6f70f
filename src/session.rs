use glam::Vec2;
use std::io::Write;
use std::time::Instant;

use crate::camera::Camera;
use crate::config::SessionConfig;
use crate::data_loader::Frame;
use crate::detector::MarkerDetector;
use crate::error::Result;
use crate::gaze_index::TemporalGazeIndex;
use crate::io::{GazePointWriter, RunSummary};
use crate::normalize::to_physical;
use crate::projection::GazeProjector;
use crate::surface::{SurfacePoseEstimator, SurfaceTransform};
use crate::types::{
    GazeSample, MarkerObservation, PhysicalGazePoint, PoseStrategy, StageTimings,
};

/// What happened during one frame.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub timestamp: f64,
    pub observations: Vec<MarkerObservation>,
    pub strategy: Option<PoseStrategy>,
    pub surface: SurfaceTransform,
    pub gaze: GazeSample,
    /// Surface-local hit, `None` when the gaze missed the surface.
    pub hit: Option<Vec2>,
    pub point: Option<PhysicalGazePoint>,
    /// Detection time is zero when observations were passed to `step`.
    pub timings: StageTimings,
}

/// One processing session: detector, surface tracking and gaze projection
/// for a single recording.
///
/// Frames must be fed in playback order; each call finishes pose update,
/// projection and normalization before returning.
pub struct Session<D: MarkerDetector> {
    detector: D,
    estimator: SurfacePoseEstimator,
    gaze_index: TemporalGazeIndex,
    projector: GazeProjector,
    camera: Camera,
    frame_interval: f32,
    last_timestamp: Option<f64>,
}

impl<D: MarkerDetector> Session<D> {
    pub fn new(
        config: &SessionConfig,
        detector: D,
        camera: Camera,
        gaze_samples: Vec<GazeSample>,
    ) -> Result<Session<D>> {
        config.validate()?;
        let gaze_index = TemporalGazeIndex::new(gaze_samples)?;
        Ok(Session {
            detector,
            estimator: SurfacePoseEstimator::from_config(config)?,
            gaze_index,
            projector: GazeProjector::new(&config.projector),
            camera,
            frame_interval: config.estimator.frame_interval,
            last_timestamp: None,
        })
    }

    /// Runs the pipeline for already detected markers.
    pub fn step(&mut self, timestamp: f64, observations: Vec<MarkerObservation>) -> FrameOutcome {
        let dt = match self.last_timestamp {
            Some(last) if timestamp > last => (timestamp - last) as f32,
            _ => self.frame_interval,
        };
        self.last_timestamp = Some(timestamp);
        let mut timings = StageTimings::default();

        let now = Instant::now();
        self.estimator.update_with_elapsed(&observations, dt);
        timings.pose_update = now.elapsed().as_secs_f64();
        let strategy = if observations.is_empty() {
            None
        } else {
            self.estimator.last_strategy()
        };
        let surface = *self.estimator.surface();

        let now = Instant::now();
        let gaze = *self.gaze_index.nearest(timestamp);
        timings.gaze_lookup = now.elapsed().as_secs_f64();

        let now = Instant::now();
        let hit = self.projector.project(gaze.gaze, &surface, &self.camera);
        let point = hit.map(|local| {
            let physical = to_physical(local, surface.dimensions());
            PhysicalGazePoint {
                timestamp,
                x_cm: physical.x,
                y_cm: physical.y,
            }
        });
        timings.projection = now.elapsed().as_secs_f64();
        if hit.is_none() {
            log::trace!("gaze at {:.3}s missed the surface", timestamp);
        }

        FrameOutcome {
            timestamp,
            observations,
            strategy,
            surface,
            gaze,
            hit,
            point,
            timings,
        }
    }

    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameOutcome> {
        let now = Instant::now();
        let observations = self.detector.detect(&frame.image)?;
        let detection = now.elapsed().as_secs_f64();

        let mut outcome = self.step(frame.timestamp, observations);
        outcome.timings.detection = detection;
        let t = &outcome.timings;
        log::debug!(
            "frame {:.3}s: detect {:.3} ms, pose {:.3} ms, gaze {:.3} ms, raycast {:.3} ms",
            frame.timestamp,
            t.detection * 1e3,
            t.pose_update * 1e3,
            t.gaze_lookup * 1e3,
            t.projection * 1e3
        );
        Ok(outcome)
    }

    /// Processes every frame in order, appending each gaze point to `writer`
    /// before the next frame is pulled. `on_frame` sees every outcome.
    pub fn run<I, W, F>(
        &mut self,
        frames: I,
        writer: &mut GazePointWriter<W>,
        mut on_frame: F,
    ) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<Frame>>,
        W: Write,
        F: FnMut(&FrameOutcome),
    {
        let mut summary = RunSummary::default();
        for frame in frames {
            let outcome = self.process_frame(&frame?)?;
            summary.frames += 1;
            summary.timings.accumulate(&outcome.timings);
            if let Some(strategy) = outcome.strategy {
                summary.frames_with_markers += 1;
                summary.record_strategy(strategy);
            }
            if let Some(point) = &outcome.point {
                writer.write(point)?;
                summary.gaze_points += 1;
            }
            on_frame(&outcome);
        }
        log::info!(
            "processed {} frames, {} with markers, {} gaze points",
            summary.frames,
            summary.frames_with_markers,
            summary.gaze_points
        );
        Ok(summary)
    }

    pub fn surface(&self) -> &SurfaceTransform {
        self.estimator.surface()
    }

    pub fn estimator(&self) -> &SurfacePoseEstimator {
        &self.estimator
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}
