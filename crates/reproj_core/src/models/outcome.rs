//! Per-file outcomes and the run summary they aggregate into.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::dataset::{Dataset, DatasetKind};

/// What happened to one input dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Reprojected into the output folder.
    Converted,
    /// An output already existed at the computed path.
    SkippedExists,
    /// Vector input with no source coordinate system.
    SkippedUndefinedCrs,
    /// The engine reported an execution failure (diagnostic attached).
    Failed(String),
}

impl FileOutcome {
    /// Whether this outcome counts towards the success total.
    pub fn is_converted(&self) -> bool {
        matches!(self, FileOutcome::Converted)
    }
}

/// Outcome for a single dataset, with the output path it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Base name of the input.
    pub name: String,
    /// Raster or vector.
    pub kind: DatasetKind,
    /// Computed output path (may not exist if the file was skipped or failed).
    pub output_path: PathBuf,
    /// What happened.
    pub outcome: FileOutcome,
}

impl FileReport {
    /// Build a report for a dataset.
    pub fn new(dataset: &Dataset, output_path: PathBuf, outcome: FileOutcome) -> Self {
        Self {
            name: dataset.file_name(),
            kind: dataset.kind,
            output_path,
            outcome,
        }
    }
}

/// Aggregated result of one batch run.
///
/// Reports are kept in processing order: all rasters, then all vectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Folder that was scanned.
    pub input_dir: PathBuf,
    /// Folder outputs were written to.
    pub output_dir: PathBuf,
    /// Name of the target coordinate system.
    pub target: String,
    /// Whether this run had to create the output folder.
    pub output_dir_created: bool,
    /// When the run started.
    pub started_at: String,
    /// When the run finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    /// One entry per dataset processed.
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    /// Start a new summary.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            target: target.into(),
            started_at: chrono::Local::now().to_rfc3339(),
            ..Default::default()
        }
    }

    /// Append a file report.
    pub fn record(&mut self, report: FileReport) {
        self.reports.push(report);
    }

    /// Stamp the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(chrono::Local::now().to_rfc3339());
    }

    /// Number of datasets reprojected in this run.
    pub fn success_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_converted())
            .count()
    }

    /// Base names of vectors skipped for lacking a coordinate system, in order.
    pub fn undefined_crs(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| r.outcome == FileOutcome::SkippedUndefinedCrs)
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Number of datasets skipped because their output already existed.
    pub fn skipped_existing(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome == FileOutcome::SkippedExists)
            .count()
    }

    /// Reports for datasets the engine failed on.
    pub fn failures(&self) -> Vec<&FileReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Failed(_)))
            .collect()
    }

    /// Total datasets seen.
    pub fn total(&self) -> usize {
        self.reports.len()
    }
}
