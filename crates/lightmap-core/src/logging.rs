//! Logging configuration
//!
//! Holds the user-facing logging settings. Installing the subscriber is left
//! to the binary; this module only knows where log files go and how many of
//! them to keep.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level: `trace`, `debug`, `info`, `warn` or `error`
    pub level: String,
    /// Write log lines to stderr
    pub console_output: bool,
    /// Write log lines to a file in `log_directory`
    pub file_output: bool,
    /// Directory for log files
    pub log_directory: PathBuf,
    /// Number of log files kept after cleanup
    pub max_log_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        let log_directory = dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("lightmap")
            .join("logs");

        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_directory,
            max_log_files: 10,
        }
    }
}

impl LogConfig {
    /// Parse `level`, falling back to INFO for unknown values
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    /// Create the log directory if it does not exist
    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.log_directory)
    }

    /// Path of the log file for the current session
    pub fn current_log_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        self.log_directory.join(format!("lightmap_{stamp}.log"))
    }

    /// Delete the oldest `lightmap_*.log` files beyond `max_log_files`.
    ///
    /// Returns the number of removed files.
    pub fn cleanup_old_logs(&self) -> std::io::Result<usize> {
        if !self.log_directory.exists() {
            return Ok(0);
        }

        let mut logs: Vec<PathBuf> = fs::read_dir(&self.log_directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("lightmap_") && name.ends_with(".log"))
            })
            .collect();

        if logs.len() <= self.max_log_files {
            return Ok(0);
        }

        // Timestamped names sort chronologically
        logs.sort();
        let excess = logs.len() - self.max_log_files;
        for path in &logs[..excess] {
            fs::remove_file(path)?;
        }
        Ok(excess)
    }
}
