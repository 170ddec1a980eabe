//! File references yielded by dataset enumeration.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Kind of geospatial dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Grid data (imagery, elevation).
    Raster,
    /// Feature data (points, lines, polygons).
    Vector,
}

impl DatasetKind {
    /// Lowercase label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Raster => "raster",
            DatasetKind::Vector => "vector",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A dataset found in the input folder.
///
/// Read-only: the batch never modifies its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Full path to the dataset file.
    pub path: PathBuf,
    /// Raster or vector.
    pub kind: DatasetKind,
}

impl Dataset {
    /// Create a dataset reference.
    pub fn new(path: impl Into<PathBuf>, kind: DatasetKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Create a raster dataset reference.
    pub fn raster(path: impl Into<PathBuf>) -> Self {
        Self::new(path, DatasetKind::Raster)
    }

    /// Create a vector dataset reference.
    pub fn vector(path: impl Into<PathBuf>) -> Self {
        Self::new(path, DatasetKind::Vector)
    }

    /// Base file name, including extension.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    /// Path to the dataset.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_base_name() {
        let ds = Dataset::raster("/data/in/elevA.tif");
        assert_eq!(ds.file_name(), "elevA.tif");
        assert_eq!(ds.kind, DatasetKind::Raster);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&DatasetKind::Vector).unwrap();
        assert_eq!(json, "\"vector\"");
        assert_eq!(DatasetKind::Raster.to_string(), "raster");
    }
}
