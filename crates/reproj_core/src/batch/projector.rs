//! Batch projector that walks the input folder and reprojects each dataset.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::config::BatchConfig;
use super::errors::{BatchError, BatchResult};
use crate::engine::{EngineError, GisEngine};
use crate::logging::RunLogger;
use crate::models::{Dataset, DatasetKind, FileOutcome, FileReport, RunSummary};
use crate::naming::find_name_collisions;

/// Reprojects every raster and vector directly inside the input folder.
///
/// Processing order:
/// 1. List rasters, then vectors
/// 2. Create the output folder if it is missing
/// 3. Each raster: skip if its output exists, otherwise reproject
/// 4. Each vector: skip if its output exists, skip if it has no coordinate
///    system, otherwise reproject
/// 5. Report undefined-CRS files and the success count
///
/// Engine execution failures are recorded per file and the run continues.
/// Any other engine error aborts the run.
pub struct BatchProjector<E: GisEngine> {
    engine: E,
    config: BatchConfig,
    logger: Arc<RunLogger>,
}

impl<E: GisEngine> BatchProjector<E> {
    /// Create a projector.
    pub fn new(engine: E, config: BatchConfig, logger: Arc<RunLogger>) -> Self {
        Self {
            engine,
            config,
            logger,
        }
    }

    /// The engine in use.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Run the batch.
    pub fn run(&self) -> BatchResult<RunSummary> {
        let input_dir = self.config.input_dir();
        let output_dir = self.config.output_dir();
        let target = self.config.target();

        if !input_dir.exists() {
            return Err(BatchError::InputNotFound(input_dir.to_path_buf()));
        }
        if !input_dir.is_dir() {
            return Err(BatchError::InputNotADirectory(input_dir.to_path_buf()));
        }

        self.logger.phase("Batch reprojection");
        self.logger.debug(&format!("Engine: {}", self.engine.name()));
        self.logger.debug(&format!("Input folder: {}", input_dir.display()));
        self.logger.debug(&format!("Output folder: {}", output_dir.display()));
        self.logger.debug(&format!("Target coordinate system: {}", target.name()));

        let rasters = self
            .engine
            .list_datasets(input_dir, DatasetKind::Raster)
            .map_err(|e| BatchError::enumeration(DatasetKind::Raster, e))?;
        let vectors = self
            .engine
            .list_datasets(input_dir, DatasetKind::Vector)
            .map_err(|e| BatchError::enumeration(DatasetKind::Vector, e))?;

        tracing::info!(
            "Found {} raster(s) and {} vector(s) in {}",
            rasters.len(),
            vectors.len(),
            input_dir.display()
        );

        let mut summary = RunSummary::new(input_dir, output_dir, target.name());
        summary.output_dir_created = ensure_output_dir(output_dir)?;
        if summary.output_dir_created {
            self.logger
                .debug(&format!("Created output folder {}", output_dir.display()));
        }

        for collision in find_name_collisions(&rasters, self.config.naming()) {
            self.logger.warn(&format!(
                "{} and {} both map to {}; only the first to succeed is written",
                collision.first, collision.second, collision.output_name
            ));
        }

        self.logger.section("Rasters");
        for raster in &rasters {
            let report = self.process_raster(raster)?;
            summary.record(report);
        }

        self.logger.section("Vectors");
        for vector in &vectors {
            let report = self.process_vector(vector)?;
            summary.record(report);
        }

        summary.finish();
        self.report_summary(&summary);
        self.logger.flush();

        Ok(summary)
    }

    /// Process one raster.
    fn process_raster(&self, raster: &Dataset) -> BatchResult<FileReport> {
        let output = self.config.output_path_for(raster);

        if self.engine.exists(&output) {
            self.log_skip_existing(raster);
            return Ok(FileReport::new(raster, output, FileOutcome::SkippedExists));
        }

        let outcome = self.reproject(raster, &output)?;
        Ok(FileReport::new(raster, output, outcome))
    }

    /// Process one vector.
    fn process_vector(&self, vector: &Dataset) -> BatchResult<FileReport> {
        let name = vector.file_name();
        let output = self.config.output_path_for(vector);

        if self.engine.exists(&output) {
            self.log_skip_existing(vector);
            return Ok(FileReport::new(vector, output, FileOutcome::SkippedExists));
        }

        let source = match self.engine.describe_spatial_reference(vector) {
            Ok(source) => source,
            Err(e) => {
                let outcome = self.recover(vector, e)?;
                return Ok(FileReport::new(vector, output, outcome));
            }
        };

        let outcome = match source {
            None => {
                self.logger.line(&format!(
                    "Skipping {} - Input coordinate system is not defined.",
                    name
                ));
                FileOutcome::SkippedUndefinedCrs
            }
            Some(source) => {
                self.logger
                    .debug(&format!("{} source coordinate system: {}", name, source.name()));
                self.reproject(vector, &output)?
            }
        };

        Ok(FileReport::new(vector, output, outcome))
    }

    /// Reproject a dataset, converting recoverable engine failures to outcomes.
    fn reproject(&self, dataset: &Dataset, output: &Path) -> BatchResult<FileOutcome> {
        match self
            .engine
            .reproject(dataset, output, self.config.target())
        {
            Ok(()) => {
                self.logger.line(&format!(
                    "Converted {} to {}",
                    dataset.file_name(),
                    file_name_of(output)
                ));
                Ok(FileOutcome::Converted)
            }
            Err(e) => self.recover(dataset, e),
        }
    }

    /// Record a recoverable engine error as a failure, or abort the run.
    fn recover(&self, dataset: &Dataset, error: EngineError) -> BatchResult<FileOutcome> {
        let name = dataset.file_name();
        if !error.is_recoverable() {
            self.logger.error(&format!("{} {}: {}", dataset.kind, name, error));
            return Err(BatchError::engine(name, dataset.kind, error));
        }

        let diagnostic = error.diagnostic();
        self.logger.line(&format!(
            "Failed to project {} {}: {}",
            dataset.kind, name, diagnostic
        ));
        Ok(FileOutcome::Failed(diagnostic))
    }

    fn log_skip_existing(&self, dataset: &Dataset) {
        self.logger.line(&format!(
            "Skipping {} - Output file already exists.",
            dataset.file_name()
        ));
    }

    /// Print the undefined-CRS list and the success count.
    ///
    /// These are run lines and are written whatever the log level.
    fn report_summary(&self, summary: &RunSummary) {
        let undefined = summary.undefined_crs();
        if !undefined.is_empty() {
            self.logger
                .line("The following files were skipped due to undefined coordinate systems:");
            for name in undefined {
                self.logger.line(&format!("- {}", name));
            }
        }

        let failures = summary.failures();
        if !failures.is_empty() {
            self.logger.warn(&format!(
                "{} layer(s) failed to project",
                failures.len()
            ));
        }

        self.logger.line(&format!(
            "Conversion completed. {} layers successfully converted.",
            summary.success_count()
        ));
    }
}

/// Create the output folder if missing.
///
/// Returns whether it had to be created.
fn ensure_output_dir(path: &Path) -> BatchResult<bool> {
    if path.is_dir() {
        return Ok(false);
    }

    fs::create_dir_all(path).map_err(|source| BatchError::OutputSetup {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
