//! Validated job configuration.

use std::path::{Path, PathBuf};

use super::errors::{BatchError, BatchResult};
use crate::config::Settings;
use crate::models::{Dataset, SpatialReference};
use crate::naming::NamingPolicy;

/// Immutable parameters for one batch run.
///
/// Validated at construction: both paths are non-empty and the target
/// descriptor parses, so a bad job fails before any file is touched.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    input_dir: PathBuf,
    output_dir: PathBuf,
    target: SpatialReference,
    naming: NamingPolicy,
}

impl BatchConfig {
    /// Build and validate a configuration with default naming.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        target_descriptor: &str,
    ) -> BatchResult<Self> {
        let input_dir = input_dir.into();
        let output_dir = output_dir.into();

        if input_dir.as_os_str().is_empty() {
            return Err(BatchError::invalid_config("input folder is empty"));
        }
        if output_dir.as_os_str().is_empty() {
            return Err(BatchError::invalid_config("output folder is empty"));
        }

        let target = SpatialReference::parse(target_descriptor)?;

        Ok(Self {
            input_dir,
            output_dir,
            target,
            naming: NamingPolicy::default(),
        })
    }

    /// Build from loaded settings.
    pub fn from_settings(settings: &Settings) -> BatchResult<Self> {
        let config = Self::new(
            &settings.job.input_folder,
            &settings.job.output_folder,
            &settings.job.target_projection,
        )?;
        Ok(config.with_naming(settings.naming.to_policy()))
    }

    /// Replace the naming policy.
    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    /// Folder scanned for datasets.
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Folder outputs are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target coordinate system.
    pub fn target(&self) -> &SpatialReference {
        &self.target
    }

    /// Output naming policy.
    pub fn naming(&self) -> &NamingPolicy {
        &self.naming
    }

    /// Output path for a dataset.
    pub fn output_path_for(&self, dataset: &Dataset) -> PathBuf {
        self.output_dir.join(self.naming.output_name(dataset))
    }
}
