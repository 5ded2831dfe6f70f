use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("gaze sample sequence is empty")]
    EmptyGazeSequence,
    #[error("marker id {0} is registered more than once")]
    DuplicateMarkerId(u32),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown tag family \"{0}\"")]
    UnknownTagFamily(String),
    #[error("frame is {got_w}x{got_h} but the detector was set up for {want_w}x{want_h}")]
    ResolutionMismatch {
        got_w: u32,
        got_h: u32,
        want_w: u32,
        want_h: u32,
    },
    #[error("malformed gaze record #{index}: {reason}")]
    MalformedGazeRecord { index: usize, reason: String },
    #[error("no frames found under {0}")]
    NoFrames(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, Error>;
