//! Configuration management for batch reprojection.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use reproj_core::config::{ConfigManager, ConfigSection};
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new("reproj.toml");
//! config.load_or_create().unwrap();
//!
//! // Point the job at a new folder and persist only the [job] table
//! config.settings_mut().job.input_folder = "/data/incoming".to_string();
//! config.update_section(ConfigSection::Job).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, JobSettings, LoggingSettings, NamingSettings, Settings, ToolSettings,
    WEB_MERCATOR_AUX_SPHERE_WKT,
};
