//! Config manager for loading, saving, and atomic updates.
//!
//! Key features:
//! - Atomic writes (write to temp file, then rename)
//! - Section-level updates (only modified section is changed)
//! - Validation on load (unknown tables are dropped on the next save)
//! - Preserves comments and formatting with toml_edit

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid [{section}] settings: {message}")]
    Invalid {
        section: &'static str,
        message: String,
    },
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Manages the batch configuration file.
///
/// Handles loading, saving, and atomic section-level updates.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get a reference to the current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a mutable reference to the current settings.
    ///
    /// Note: Changes made here are only in memory until `save()` or
    /// `update_section()` is called.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load config from file.
    ///
    /// Returns error if file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        let (settings, _) = self.parse_validate_and_clean(&content)?;
        self.settings = settings;
        Ok(())
    }

    /// Load config from file, creating with defaults if it doesn't exist.
    ///
    /// Also validates and cleans up the config, saving if changes were made.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let (settings, was_modified) = self.parse_validate_and_clean(&content)?;
            self.settings = settings;

            if was_modified {
                tracing::info!("Rewriting {} with defaults filled in", self.config_path.display());
                self.save()?;
            }
        } else {
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Parse, validate, and clean up config content.
    ///
    /// Returns the settings and whether the file differs from what `save()`
    /// would write (unknown tables, missing defaults).
    fn parse_validate_and_clean(&self, content: &str) -> ConfigResult<(Settings, bool)> {
        let doc: DocumentMut = content.parse()?;

        // Missing fields pick up their defaults here
        let settings: Settings = toml::from_str(content)?;
        Self::validate(&settings)?;

        let valid_sections: Vec<&str> = ConfigSection::ALL.iter().map(|s| s.table_name()).collect();
        let mut has_unknown = false;

        for (key, _) in doc.iter() {
            if !valid_sections.contains(&key) {
                tracing::warn!("Ignoring unknown config section [{}]", key);
                has_unknown = true;
            }
        }

        let regenerated = Self::render(&settings)?;
        let was_modified = has_unknown || content.trim() != regenerated.trim();

        Ok((settings, was_modified))
    }

    /// Reject settings no run could use.
    ///
    /// The target projection is not checked here; `BatchConfig` parses it
    /// once command-line overrides have been applied.
    fn validate(settings: &Settings) -> ConfigResult<()> {
        let invalid = |section: ConfigSection, message: String| ConfigError::Invalid {
            section: section.table_name(),
            message,
        };

        let naming = &settings.naming;
        if naming.raster_prefix.is_empty() || naming.vector_prefix.is_empty() {
            return Err(invalid(
                ConfigSection::Naming,
                "output prefixes must not be empty (outputs could replace their inputs)"
                    .to_string(),
            ));
        }

        let tools = &settings.tools;
        if tools.raster_extensions.is_empty() && tools.vector_extensions.is_empty() {
            return Err(invalid(
                ConfigSection::Tools,
                "no raster or vector extensions configured".to_string(),
            ));
        }
        if let Some(ext) = tools.raster_extensions.iter().find(|r| {
            tools
                .vector_extensions
                .iter()
                .any(|v| v.eq_ignore_ascii_case(r))
        }) {
            return Err(invalid(
                ConfigSection::Tools,
                format!("extension '{}' is listed as both raster and vector", ext),
            ));
        }

        Ok(())
    }

    /// Save the entire config atomically.
    ///
    /// Writes to a temp file first, then renames to ensure atomic write.
    pub fn save(&self) -> ConfigResult<()> {
        let content = Self::render(&self.settings)?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Update a specific section atomically.
    ///
    /// This re-reads the file from disk, updates only the specified section,
    /// and writes back atomically. Comments and other sections are kept.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let current_content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current_content.is_empty() {
            DocumentMut::new()
        } else {
            current_content.parse()?
        };

        let section_toml = Self::section_toml(&self.settings, section)?;
        let section_doc: DocumentMut = section_toml.parse()?;
        let section_table = section_doc.as_table().clone();

        doc[section.table_name()] = Item::Table(section_table);

        self.atomic_write(&doc.to_string())?;

        Ok(())
    }

    /// Serialize one section's fields (without its table header).
    fn section_toml(settings: &Settings, section: ConfigSection) -> ConfigResult<String> {
        let content = match section {
            ConfigSection::Job => toml::to_string_pretty(&settings.job)?,
            ConfigSection::Naming => toml::to_string_pretty(&settings.naming)?,
            ConfigSection::Tools => toml::to_string_pretty(&settings.tools)?,
            ConfigSection::Logging => toml::to_string_pretty(&settings.logging)?,
        };
        Ok(content)
    }

    /// Render the full config file with section comments.
    fn render(settings: &Settings) -> ConfigResult<String> {
        let mut output = String::new();

        output.push_str("# Batch reprojection configuration\n");
        output.push_str(
            "# This file is auto-generated. Comments may be preserved on section updates.\n",
        );

        for section in ConfigSection::ALL {
            output.push('\n');
            output.push_str(&format!("# {}\n", section.comment()));
            output.push_str(&format!("[{}]\n", section.table_name()));
            for line in Self::section_toml(settings, section)?.lines() {
                output.push_str(line);
                output.push('\n');
            }
        }

        Ok(output)
    }

    /// Write content to config file atomically.
    ///
    /// Writes to a temp file first, then renames.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_or_create_creates_default() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(".config").join("reproj.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[job]"));
        assert!(content.contains("[naming]"));
        assert!(content.contains("raster_name_limit = 8"));
    }

    #[test]
    fn saved_config_round_trips() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("reproj.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.settings_mut().job.input_folder = "/data/in".to_string();
        manager.save().unwrap();

        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings(), manager.settings());

        let content = fs::read_to_string(&config_path).unwrap();
        let (_, modified) = reloaded.parse_validate_and_clean(&content).unwrap();
        assert!(!modified);
    }

    #[test]
    fn load_or_create_preserves_existing() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("reproj.toml");

        fs::write(
            &config_path,
            "[job]\noutput_folder = \"my_custom_folder\"\n[legacy]\nkey = 1\n",
        )
        .unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert_eq!(manager.settings().job.output_folder, "my_custom_folder");
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(!content.contains("[legacy]"));
        assert!(content.contains("my_custom_folder"));
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("absent.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn update_section_only_changes_target() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("reproj.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        manager.settings_mut().job.target_projection = "EPSG:32613".to_string();
        manager.settings_mut().naming.raster_name_limit = 0;
        manager.update_section(ConfigSection::Job).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("target_projection = \"EPSG:32613\""));
        // naming was not written back
        assert!(content.contains("raster_name_limit = 8"));
        assert!(content.contains("# Logging configuration"));
    }

    #[test]
    fn rejects_overlapping_extensions() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("reproj.toml");
        fs::write(
            &config_path,
            "[tools]\nraster_extensions = [\"tif\", \"json\"]\nvector_extensions = [\"shp\", \"JSON\"]\n",
        )
        .unwrap();

        let mut manager = ConfigManager::new(&config_path);
        let err = manager.load().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { section: "tools", .. }));
        assert!(err.to_string().contains("'json'"));
    }

    #[test]
    fn rejects_empty_vector_prefix() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("reproj.toml");
        fs::write(&config_path, "[naming]\nvector_prefix = \"\"\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        assert!(matches!(
            manager.load_or_create(),
            Err(ConfigError::Invalid { section: "naming", .. })
        ));
        // File is left as written
        assert!(fs::read_to_string(&config_path)
            .unwrap()
            .contains("vector_prefix = \"\""));
    }

    #[test]
    fn atomic_write_creates_no_temp_on_success() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("reproj.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let temp_path = config_path.with_extension("toml.tmp");
        assert!(!temp_path.exists());
    }
}
