pub mod estimator;
pub mod transform;

pub use estimator::*;
pub use transform::*;
