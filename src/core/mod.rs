pub mod confidence;
pub mod error;
pub mod geometry;
pub mod model;
pub mod stats;

pub use error::{Result, SlipError};
