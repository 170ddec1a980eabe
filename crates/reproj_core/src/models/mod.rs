//! Data models for batch reprojection.
//!
//! This module contains the transient structures of a run:
//! - Spatial reference descriptors (target and source)
//! - Dataset references yielded by enumeration
//! - Per-file outcomes and the run summary

mod dataset;
mod outcome;
mod spatial_ref;

pub use dataset::{Dataset, DatasetKind};
pub use outcome::{FileOutcome, FileReport, RunSummary};
pub use spatial_ref::{SpatialRefError, SpatialReference};
