use clap::{Parser, Subcommand};
use indicatif::ProgressIterator;
use std::time::Instant;
use tabletop_gaze::camera::Camera;
use tabletop_gaze::config::SessionConfig;
use tabletop_gaze::data_loader::{ImageSequence, load_gaze_samples};
use tabletop_gaze::detector::AprilTagDetector;
use tabletop_gaze::io::{GazePointWriter, object_from_json, write_session_report};
use tabletop_gaze::registry::MarkerRegistry;
use tabletop_gaze::session::Session;
use tabletop_gaze::visualization::SurfaceRecorder;

#[derive(Parser)]
#[command(version, about, author)]
struct TtGazeCli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a gaze recording onto the table seen in an image sequence
    Run {
        /// path to the folder with video frames (png or jpg)
        frames: String,

        /// path to the eye-tracker gaze data file
        gaze: String,

        /// session configuration JSON, defaults are used when omitted
        #[arg(short, long)]
        config: Option<String>,

        /// file the gaze points are appended to
        #[arg(short, long, default_value = "gaze_points.jsonl")]
        output: String,

        /// frame rate of the sequence; otherwise timestamps are read from file names (ns)
        #[arg(long)]
        fps: Option<f64>,

        /// write a summary report to this file
        #[arg(long)]
        report: Option<String>,

        /// save a rerun recording (.rrd) of the reconstruction
        #[arg(long)]
        rerun: Option<String>,
    },
    /// Print the default configuration
    DefaultConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = TtGazeCli::parse();

    match cli.command {
        Commands::DefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&SessionConfig::default())?);
        }
        Commands::Run {
            frames,
            gaze,
            config,
            output,
            fps,
            report,
            rerun,
        } => {
            let config: SessionConfig = match &config {
                Some(path) => object_from_json(path)?,
                None => SessionConfig::default(),
            };
            config.validate()?;

            let [width, height] = config.detector.resolution;
            let camera = Camera::new(&config.camera, width, height);
            let detector = AprilTagDetector::new(&config.detector, &camera)?;
            let samples = load_gaze_samples(&gaze)?;
            let mut session = Session::new(&config, detector, camera, samples)?;

            let recorder = match &rerun {
                Some(path) => Some(SurfaceRecorder::save(
                    path,
                    MarkerRegistry::new(&config.table.markers)?,
                    config.table.scale_calibration,
                )?),
                None => None,
            };

            let sequence = ImageSequence::open(&frames, fps)?;
            let frame_count = sequence.len() as u64;
            let mut writer = GazePointWriter::append_to(&output)?;
            let now = Instant::now();
            let summary = session.run(
                sequence.progress_count(frame_count),
                &mut writer,
                |outcome| {
                    if let Some(recorder) = &recorder {
                        if let Err(e) = recorder.log_frame(outcome) {
                            log::warn!("rerun logging failed: {}", e);
                        }
                    }
                },
            )?;
            let duration_sec = now.elapsed().as_secs_f64();
            log::info!(
                "processing took {:.3} sec, avg {:.6} sec per frame",
                duration_sec,
                duration_sec / summary.frames.max(1) as f64
            );
            let t = &summary.timings;
            log::info!(
                "stage totals: detect {:.3} sec, pose {:.3} sec, gaze {:.3} sec, raycast {:.3} sec",
                t.detection,
                t.pose_update,
                t.gaze_lookup,
                t.projection
            );

            if let Some(report_path) = &report {
                write_session_report(report_path, &gaze, &frames, &output, &summary)?;
            }
        }
    }
    Ok(())
}
