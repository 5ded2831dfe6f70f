//! Surface pose fusion and gaze projection for table-top eye-tracking.
//!
//! Markers detected on a table give the table's pose; each video frame's
//! gaze sample is cast onto that table and logged in physical units.

pub mod camera;
pub mod config;
pub mod data_loader;
pub mod detector;
pub mod error;
pub mod gaze_index;
pub mod io;
pub mod normalize;
pub mod projection;
pub mod registry;
pub mod session;
pub mod surface;
pub mod synthetic;
pub mod types;
pub mod util;
pub mod visualization;

pub use error::{Error, Result};
