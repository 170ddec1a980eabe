//! Output file naming.
//!
//! Rasters are written as `proj_` plus the first 8 characters of the input
//! base name; vectors as `projected_` plus the full base name. The raster
//! limit is kept by default so existing output folders are recognised, but
//! it drops the extension of most inputs and maps distinct inputs onto the
//! same name. [`find_name_collisions`] reports those pairs up front.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Dataset, DatasetKind};

/// Default raster output prefix.
pub const RASTER_PREFIX: &str = "proj_";
/// Default vector output prefix.
pub const VECTOR_PREFIX: &str = "projected_";
/// Default number of base-name characters kept for raster outputs.
pub const RASTER_NAME_LIMIT: usize = 8;

/// How output names are derived from input names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingPolicy {
    /// Prefix for raster outputs.
    pub raster_prefix: String,
    /// Prefix for vector outputs.
    pub vector_prefix: String,
    /// Characters of the raster base name to keep (`None` keeps all).
    pub raster_name_limit: Option<usize>,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            raster_prefix: RASTER_PREFIX.to_string(),
            vector_prefix: VECTOR_PREFIX.to_string(),
            raster_name_limit: Some(RASTER_NAME_LIMIT),
        }
    }
}

impl NamingPolicy {
    /// Policy that keeps full raster names.
    pub fn full_names() -> Self {
        Self {
            raster_name_limit: None,
            ..Default::default()
        }
    }

    /// Output file name for a dataset.
    pub fn output_name(&self, dataset: &Dataset) -> String {
        let name = dataset.file_name();
        match dataset.kind {
            DatasetKind::Raster => self.raster_output_name(&name),
            DatasetKind::Vector => self.vector_output_name(&name),
        }
    }

    /// Output file name for a raster base name.
    ///
    /// Truncation counts characters, not bytes.
    pub fn raster_output_name(&self, file_name: &str) -> String {
        let kept: String = match self.raster_name_limit {
            Some(limit) => file_name.chars().take(limit).collect(),
            None => file_name.to_string(),
        };
        format!("{}{}", self.raster_prefix, kept)
    }

    /// Output file name for a vector base name.
    pub fn vector_output_name(&self, file_name: &str) -> String {
        format!("{}{}", self.vector_prefix, file_name)
    }
}

/// Two inputs that resolve to the same output name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    /// Shared output name.
    pub output_name: String,
    /// Input processed first (will be written).
    pub first: String,
    /// Input processed later (will be skipped as existing).
    pub second: String,
}

/// Find datasets whose output names collide, in processing order.
///
/// Each later input is paired with the first input that claimed the name.
pub fn find_name_collisions(datasets: &[Dataset], policy: &NamingPolicy) -> Vec<NameCollision> {
    let mut claimed: HashMap<String, String> = HashMap::new();
    let mut collisions = Vec::new();

    for dataset in datasets {
        let output_name = policy.output_name(dataset);
        let input_name = dataset.file_name();
        match claimed.get(&output_name) {
            Some(first) => collisions.push(NameCollision {
                output_name,
                first: first.clone(),
                second: input_name,
            }),
            None => {
                claimed.insert(output_name, input_name);
            }
        }
    }

    collisions
}
