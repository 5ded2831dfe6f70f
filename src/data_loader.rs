use glam::Vec2;
use glob::glob;
use image::{DynamicImage, ImageReader};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::GazeSample;

/// One record of an eye-tracker gaze data file.
#[derive(Debug, Clone, Deserialize)]
pub struct GazeRecord {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub timestamp: f64,
    #[serde(default)]
    pub data: GazeRecordData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GazeRecordData {
    #[serde(default)]
    pub gaze2d: Vec<f64>,
}

/// Parses concatenated or newline-separated gaze records and drops those
/// without 2D gaze, keeping file order.
pub fn parse_gaze_samples(contents: &str) -> Result<Vec<GazeSample>> {
    let mut samples = Vec::new();
    let stream = serde_json::Deserializer::from_str(contents).into_iter::<GazeRecord>();
    for (index, record) in stream.enumerate() {
        let record = record?;
        match record.data.gaze2d.as_slice() {
            [] => continue,
            [x, y] => samples.push(GazeSample::new(
                record.timestamp,
                Vec2::new(*x as f32, *y as f32),
            )),
            other => {
                return Err(Error::MalformedGazeRecord {
                    index,
                    reason: format!("gaze2d has {} values", other.len()),
                });
            }
        }
    }
    Ok(samples)
}

pub fn load_gaze_samples<P: AsRef<Path>>(path: P) -> Result<Vec<GazeSample>> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let samples = parse_gaze_samples(&contents)?;
    log::info!(
        "loaded {} gaze samples from {}",
        samples.len(),
        path.as_ref().display()
    );
    Ok(samples)
}

/// A decoded frame and its playback time in seconds.
pub struct Frame {
    pub timestamp: f64,
    pub image: DynamicImage,
}

/// Parses the timestamp from a file path.
///
/// Assumes the filename (without extension) is a timestamp in nanoseconds.
fn path_to_timestamp(path: &Path) -> Option<f64> {
    let time_ns: i64 = path.file_stem()?.to_str()?.parse().ok()?;
    Some(time_ns as f64 * 1e-9)
}

fn img_filter(rp: glob::GlobResult) -> Option<PathBuf> {
    if let Ok(p) = rp {
        for ext in &[".png", ".jpg"] {
            if p.as_os_str().to_string_lossy().ends_with(ext) {
                return Some(p);
            }
        }
    }
    None
}

/// Frames stored as an image sequence in one folder, read in filename order.
///
/// Timestamps come from the file stems (nanoseconds) unless `fps` is given,
/// in which case frame `i` is at `i / fps` seconds.
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    fps: Option<f64>,
    next: usize,
}

impl ImageSequence {
    pub fn open(folder: &str, fps: Option<f64>) -> Result<ImageSequence> {
        let mut paths: Vec<PathBuf> = glob(format!("{}/*", folder).as_str())?
            .filter_map(img_filter)
            .collect();
        if paths.is_empty() {
            return Err(Error::NoFrames(folder.to_string()));
        }
        paths.sort();
        log::trace!("found {} frames in {}", paths.len(), folder);
        Ok(ImageSequence {
            paths,
            fps,
            next: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn timestamp(&self, idx: usize) -> Result<f64> {
        match self.fps {
            Some(fps) => Ok(idx as f64 / fps),
            None => path_to_timestamp(&self.paths[idx]).ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "cannot read a timestamp from {}, pass a frame rate",
                    self.paths[idx].display()
                ))
            }),
        }
    }
}

impl Iterator for ImageSequence {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next;
        let path = self.paths.get(idx)?;
        self.next += 1;
        let frame = ImageReader::open(path)
            .map_err(Error::from)
            .and_then(|reader| reader.decode().map_err(Error::from))
            .and_then(|image| {
                Ok(Frame {
                    timestamp: self.timestamp(idx)?,
                    image,
                })
            });
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.paths.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ImageSequence {}
