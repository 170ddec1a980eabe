//! Batch reprojection of a folder.
//!
//! [`BatchProjector`] drives a [`crate::engine::GisEngine`] over every
//! dataset in the input folder and returns a [`crate::models::RunSummary`].

mod config;
mod errors;
mod projector;

pub use config::BatchConfig;
pub use errors::{BatchError, BatchResult};
pub use projector::BatchProjector;
