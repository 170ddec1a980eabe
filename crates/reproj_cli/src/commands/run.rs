//! Run command implementation

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use reproj_core::batch::{BatchConfig, BatchProjector};
use reproj_core::config::{ConfigManager, ConfigSection, Settings};
use reproj_core::engine::GdalCliEngine;
use reproj_core::logging::{LogLevel, RunLoggerBuilder};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Config file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Folder to scan for rasters and vectors
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Folder to write reprojected outputs to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target coordinate system as WKT or AUTHORITY:CODE
    #[arg(short, long, conflicts_with = "projection_file")]
    pub projection: Option<String>,

    /// Read the target coordinate system from a file (e.g. a .prj)
    #[arg(long)]
    pub projection_file: Option<PathBuf>,

    /// Print the run summary as JSON on stdout (run lines go to stderr)
    #[arg(long)]
    pub json: bool,

    /// Write the resolved [job] settings back to the config file
    #[arg(long, requires = "config")]
    pub save: bool,
}

pub fn execute(args: RunArgs, verbose: bool) -> Result<()> {
    let settings = resolve_settings(&args)?;
    let config = BatchConfig::from_settings(&settings).context("Invalid job configuration")?;

    if args.save {
        if let Some(path) = &args.config {
            save_job(path, &settings)?;
        }
    }

    let mut log_config = settings.logging.log_config();
    if verbose {
        log_config.level = LogLevel::Debug;
    }

    let mut builder = RunLoggerBuilder::new(run_name()).config(log_config);
    builder = if args.json {
        builder.callback(Box::new(|line| eprintln!("{}", line)))
    } else {
        builder.callback(Box::new(|line| println!("{}", line)))
    };
    if let Some(dir) = settings.logging.log_dir() {
        builder = builder.log_dir(dir);
    }
    let logger = Arc::new(builder.build().context("Failed to create run log")?);
    if let Some(path) = logger.log_path() {
        tracing::debug!("Writing log for {} to {}", logger.run_name(), path.display());
    }

    let engine = GdalCliEngine::new(settings.tools.to_gdal_tools());
    let summary = BatchProjector::new(engine, config, logger.clone()).run()?;
    logger.close();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

/// Load settings and apply command-line overrides.
fn resolve_settings(args: &RunArgs) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => {
            let mut manager = ConfigManager::new(path);
            manager
                .load()
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            tracing::debug!("Loaded config from {}", path.display());
            manager.settings().clone()
        }
        None => Settings::default(),
    };

    if let Some(input) = &args.input {
        settings.job.input_folder = input.to_string_lossy().to_string();
    }
    if let Some(output) = &args.output {
        settings.job.output_folder = output.to_string_lossy().to_string();
    }
    if let Some(projection) = &args.projection {
        settings.job.target_projection = projection.clone();
    }
    if let Some(path) = &args.projection_file {
        settings.job.target_projection = fs::read_to_string(path)
            .with_context(|| format!("Failed to read projection file {}", path.display()))?;
    }

    Ok(settings)
}

/// Persist the `[job]` section, leaving the rest of the file untouched.
fn save_job(path: &Path, settings: &Settings) -> Result<()> {
    let mut manager = ConfigManager::new(path);
    manager
        .load()
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    manager.settings_mut().job = settings.job.clone();
    manager
        .update_section(ConfigSection::Job)
        .with_context(|| format!("Failed to save [job] to {}", path.display()))?;

    tracing::debug!("Saved job settings to {}", path.display());
    Ok(())
}

fn run_name() -> String {
    format!("reproj_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}
