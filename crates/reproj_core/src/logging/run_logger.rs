//! Per-run logger with console callback and optional file output.
//!
//! Each batch run gets its own logger that:
//! - Sends every line to a console callback (stdout in the CLI)
//! - Optionally writes the same lines to `<log_dir>/<run name>.log`
//! - Filters diagnostics by level (run lines are always written)
//! - Optionally timestamps lines

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-run logger with dual output (console callback + file).
pub struct RunLogger {
    /// Run name for identification.
    run_name: String,
    /// Path to log file, if file output is enabled.
    log_path: Option<PathBuf>,
    /// File writer (buffered).
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Console callback.
    callback: Option<LogCallback>,
    /// Logging configuration.
    config: LogConfig,
}

impl RunLogger {
    /// Create a new run logger.
    ///
    /// # Arguments
    /// * `run_name` - Name of the run (used in log filename)
    /// * `log_dir` - Directory to write the log file to (`None` disables file output)
    /// * `config` - Logging configuration
    /// * `callback` - Optional console callback
    pub fn new(
        run_name: impl Into<String>,
        log_dir: Option<&Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let run_name = run_name.into();

        let (log_path, writer) = match log_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let path = dir.join(format!("{}.log", sanitize_filename(&run_name)));
                let file = File::create(&path)?;
                (Some(path), Some(BufWriter::new(file)))
            }
            None => (None, None),
        };

        Ok(Self {
            run_name,
            log_path,
            file_writer: Mutex::new(writer),
            callback,
            config,
        })
    }

    /// Get the run name.
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Get the log file path, if file output is enabled.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    /// Write a run line.
    ///
    /// Run lines (per-file results and the final summary) are the run's
    /// output, so they bypass the level filter.
    pub fn line(&self, message: &str) {
        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a section marker.
    pub fn section(&self, section_name: &str) {
        let msg = MessagePrefix::Section.format(section_name);
        self.log(LogLevel::Debug, &msg);
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release the file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    /// Format a message with timestamp (if enabled).
    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    /// Output a formatted message to file and console.
    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }

        if let Some(ref callback) = self.callback {
            callback(formatted);
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sanitize a string to be safe for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// Builder for creating a RunLogger with fluent API.
pub struct RunLoggerBuilder {
    run_name: String,
    log_dir: Option<PathBuf>,
    config: LogConfig,
    callback: Option<LogCallback>,
}

impl RunLoggerBuilder {
    /// Create a new builder.
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_name: run_name.into(),
            log_dir: None,
            config: LogConfig::default(),
            callback: None,
        }
    }

    /// Write a log file into this directory.
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Set the logging configuration.
    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the log level.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Set the console callback.
    pub fn callback(mut self, callback: LogCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Build the RunLogger.
    pub fn build(self) -> std::io::Result<RunLogger> {
        RunLogger::new(
            self.run_name,
            self.log_dir.as_deref(),
            self.config,
            self.callback,
        )
    }
}
