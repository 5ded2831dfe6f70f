use crate::error::{Error, Result};
use crate::types::GazeSample;

/// Nearest-in-time lookup over a timestamp-sorted gaze sequence.
///
/// Queries are expected to arrive with non-decreasing timestamps (one per
/// video frame). The index keeps a cursor at the last answer and only scans
/// forward from it, so a monotonic query stream costs O(1) amortized.
#[derive(Debug, Clone)]
pub struct TemporalGazeIndex {
    samples: Vec<GazeSample>,
    cursor: usize,
    last_query: Option<f64>,
}

impl TemporalGazeIndex {
    /// `samples` must be sorted ascending by timestamp; this is not checked.
    pub fn new(samples: Vec<GazeSample>) -> Result<TemporalGazeIndex> {
        if samples.is_empty() {
            return Err(Error::EmptyGazeSequence);
        }
        Ok(TemporalGazeIndex {
            samples,
            cursor: 0,
            last_query: None,
        })
    }

    /// Sample whose timestamp is closest to `timestamp`. On a tie the earlier
    /// sample wins.
    pub fn nearest(&mut self, timestamp: f64) -> &GazeSample {
        if let Some(last) = self.last_query {
            if timestamp < last {
                log::debug!(
                    "gaze query went back from {:.4}s to {:.4}s, rescanning from start",
                    last,
                    timestamp
                );
                self.cursor = 0;
            }
        }
        self.last_query = Some(timestamp);

        let mut best_idx = self.cursor;
        let mut best_diff = (self.samples[best_idx].timestamp - timestamp).abs();
        // Walk through runs of equal distance (duplicate timestamps) and stop at
        // the first sample that is strictly worse than the best so far.
        for (idx, sample) in self.samples.iter().enumerate().skip(self.cursor + 1) {
            let diff = (sample.timestamp - timestamp).abs();
            if diff > best_diff {
                break;
            }
            if diff < best_diff {
                best_diff = diff;
                best_idx = idx;
            }
        }
        self.cursor = best_idx;
        &self.samples[best_idx]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn samples(&self) -> &[GazeSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
