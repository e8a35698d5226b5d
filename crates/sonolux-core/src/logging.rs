//! Logging configuration.
//!
//! The application binary consumes this to build its `tracing` subscriber
//! stack (console layer plus a non-blocking file layer). The config lives
//! here rather than in the binary so it can sit next to the other tunables
//! in the user configuration file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::Level;

/// Logging settings: level, sinks and file retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level name ("trace", "debug", "info", "warn", "error").
    /// Invalid values fall back to "info".
    pub level: String,
    /// Mirror log output to stderr.
    pub console_output: bool,
    /// Write log output to a file under the log directory.
    pub file_output: bool,
    /// Log directory override. Defaults to the platform data-local
    /// directory under `sonolux/logs`.
    pub log_dir: Option<PathBuf>,
    /// How many old log files to keep when cleaning up.
    pub max_log_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: true,
            log_dir: None,
            max_log_files: 5,
        }
    }
}

impl LogConfig {
    /// Parses the configured level name, defaulting to INFO.
    pub fn parse_level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }

    /// Resolves the log directory: the configured override, the platform
    /// data-local directory, or `./logs` as a last resort.
    pub fn log_directory(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .map(|p| p.join("sonolux").join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    /// Creates the log directory if it does not exist yet.
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        fs::create_dir_all(self.log_directory())
    }

    /// Path of the log file for the current run. Stable for the lifetime
    /// of the process, so it can be queried repeatedly during setup.
    pub fn current_log_path(&self) -> PathBuf {
        self.log_directory()
            .join(format!("sonolux-{}.log", std::process::id()))
    }

    /// Deletes the oldest `sonolux-*.log` files beyond the retention count.
    pub fn cleanup_old_logs(&self) -> io::Result<()> {
        let dir = self.log_directory();
        if !dir.exists() {
            return Ok(());
        }

        let mut logs: Vec<(std::time::SystemTime, PathBuf)> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.starts_with("sonolux-") && name.ends_with(".log")
            })
            .filter_map(|entry| {
                let modified = entry.metadata().ok()?.modified().ok()?;
                Some((modified, entry.path()))
            })
            .collect();

        if logs.len() <= self.max_log_files {
            return Ok(());
        }

        // Oldest first.
        logs.sort_by_key(|(modified, _)| *modified);
        let excess = logs.len() - self.max_log_files;
        for (_, path) in logs.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!("Failed to remove old log file {:?}: {}", path, e);
            }
        }

        Ok(())
    }
}
