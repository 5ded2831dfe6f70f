use std::collections::BTreeMap;
use std::io::Write;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;
use crate::types::{PhysicalGazePoint, PoseStrategy, StageTimings};

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize>(output_path: &str, object: &T) -> Result<()> {
    let j = serde_json::to_string_pretty(object)?;
    std::fs::write(output_path, j)?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Appends one JSON object per line for every gaze point.
///
/// Each record is flushed before `write` returns.
pub struct GazePointWriter<W: Write> {
    inner: W,
    written: usize,
}

impl GazePointWriter<std::fs::File> {
    pub fn append_to(path: &str) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> GazePointWriter<W> {
    pub fn new(inner: W) -> Self {
        GazePointWriter { inner, written: 0 }
    }

    pub fn write(&mut self, point: &PhysicalGazePoint) -> Result<()> {
        serde_json::to_writer(&mut self.inner, point)?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Counters collected over a processing run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub frames: usize,
    pub frames_with_markers: usize,
    pub gaze_points: usize,
    pub strategies: BTreeMap<String, usize>,
    /// Per-stage times summed over all frames.
    pub timings: StageTimings,
}

impl RunSummary {
    pub fn record_strategy(&mut self, strategy: PoseStrategy) {
        let key = match strategy {
            PoseStrategy::RotationAveraging => "rotation_averaging",
            PoseStrategy::PlaneReconstruction => "plane_reconstruction",
        };
        *self.strategies.entry(key.to_string()).or_default() += 1;
    }
}

#[derive(Serialize)]
struct SessionReport<'a> {
    created: String,
    gaze_file: &'a str,
    frames_folder: &'a str,
    output: &'a str,
    summary: &'a RunSummary,
}

fn local_timestamp() -> String {
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{:+03}:{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        now.offset().whole_hours(),
        now.offset().minutes_past_hour().abs()
    )
}

/// Writes a JSON report describing a finished run.
pub fn write_session_report(
    output_path: &str,
    gaze_file: &str,
    frames_folder: &str,
    output: &str,
    summary: &RunSummary,
) -> Result<()> {
    let report = SessionReport {
        created: local_timestamp(),
        gaze_file,
        frames_folder,
        output,
        summary,
    };
    object_to_json(output_path, &report)
}
