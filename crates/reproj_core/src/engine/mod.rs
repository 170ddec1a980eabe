//! GIS engine seam.
//!
//! The batch only needs four capabilities from a GIS engine: list datasets
//! of a kind, describe a dataset's coordinate system, reproject a dataset,
//! and test whether an output exists. Everything else (transformation
//! math, format drivers, projection databases) stays behind this trait.
//!
//! [`GdalCliEngine`] implements it by running the GDAL command-line
//! utilities.

mod errors;
mod gdal;
mod srs_info;

use std::path::Path;

pub use errors::{EngineError, EngineResult};
pub use gdal::{GdalCliEngine, GdalTools};
pub use srs_info::{parse_layer_srs, parse_raster_srs};

use crate::models::{Dataset, DatasetKind, SpatialReference};

/// Capabilities the batch needs from a GIS engine.
pub trait GisEngine {
    /// Human-readable engine name (for logging).
    fn name(&self) -> &str;

    /// List datasets of one kind directly inside `dir` (non-recursive).
    fn list_datasets(&self, dir: &Path, kind: DatasetKind) -> EngineResult<Vec<Dataset>>;

    /// Read the dataset's current coordinate system.
    ///
    /// `Ok(None)` means the dataset has no coordinate system defined.
    fn describe_spatial_reference(
        &self,
        dataset: &Dataset,
    ) -> EngineResult<Option<SpatialReference>>;

    /// Reproject `dataset` into `output` under `target`.
    fn reproject(
        &self,
        dataset: &Dataset,
        output: &Path,
        target: &SpatialReference,
    ) -> EngineResult<()>;

    /// Whether a dataset already exists at `path`.
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
