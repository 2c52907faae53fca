//! Logging Module - per-run log sink
//!
//! Each conversion run gets its own log file named
//! `{program_name}_YYYYMMDD_HHMMSS.log`. The subscriber is never installed
//! globally: a [`RunLog`] owns a [`Dispatch`] and the appender's
//! [`WorkerGuard`], and callers execute the run inside [`RunLog::in_scope`].
//! Dropping (or [`RunLog::close`]-ing) the sink flushes the file.
//!
//! # Examples
//!
//! ```no_run
//! use shared_utils::logging::{LogConfig, RunLog};
//! use tracing::info;
//!
//! let log = RunLog::open("my_program", &LogConfig::default()).expect("log sink");
//! log.in_scope(|| info!("Program started"));
//! log.close();
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Timestamp pattern embedded in run log file names.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 日志配置结构
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory receiving the run log files (default `logs`)
    pub log_dir: PathBuf,
    /// Number of run logs kept for a program; older ones are pruned
    pub max_files: usize,
    /// Minimum level written, unless `RUST_LOG` is set
    pub level: Level,
    /// Mirror records to stderr
    pub console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            max_files: 30,
            level: Level::INFO,
            console: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }
}

/// Builds the file name of a run log, e.g. `heic_convert_20260131_235959.log`.
pub fn run_log_file_name(program_name: &str, started: DateTime<Local>) -> String {
    format!(
        "{}_{}.log",
        program_name,
        started.format(LOG_TIMESTAMP_FORMAT)
    )
}

/// Scoped logging sink for a single run.
pub struct RunLog {
    dispatch: Dispatch,
    path: Option<PathBuf>,
    _guard: Option<WorkerGuard>,
}

impl RunLog {
    /// Creates the log directory if needed, opens a fresh timestamped log
    /// file and prunes old run logs beyond `config.max_files`.
    pub fn open(program_name: &str, config: &LogConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.log_dir)
            .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

        let file_name = run_log_file_name(program_name, Local::now());
        let path = config.log_dir.join(&file_name);

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name.trim_end_matches(".log"))
            .filename_suffix("log")
            .build(&config.log_dir)
            .with_context(|| format!("Failed to open run log: {:?}", path))?;
        let (writer, guard) = tracing_appender::non_blocking(file_appender);

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::default().add_directive(LevelFilter::from_level(config.level).into())
        });

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true);

        let stderr_layer = config.console.then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false)
                .with_line_number(false)
        });

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stderr_layer);

        let log = Self {
            dispatch: Dispatch::new(subscriber),
            path: Some(path),
            _guard: Some(guard),
        };

        log.in_scope(|| {
            tracing::debug!(
                program = program_name,
                log_file = ?log.path,
                level = ?config.level,
                "Run log opened"
            );
            if let Err(e) = cleanup_old_logs(&config.log_dir, program_name, config.max_files) {
                tracing::warn!(error = %e, "Failed to prune old run logs");
            }
        });

        Ok(log)
    }

    /// Reuses the dispatcher that is current for the calling thread; no file
    /// is written by the sink itself.
    pub fn inherit() -> Self {
        Self {
            dispatch: tracing::dispatcher::get_default(|current| current.clone()),
            path: None,
            _guard: None,
        }
    }

    /// Path of the run log file, if this sink writes one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs `f` with this sink as the default dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Flushes pending records and closes the file.
    pub fn close(self) {
        drop(self);
    }
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog").field("path", &self.path).finish()
    }
}

/// 清理旧的日志文件，只保留最近的N个
fn cleanup_old_logs(log_dir: &Path, program_name: &str, max_files: usize) -> Result<()> {
    use std::fs;

    let entries = fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let prefix = format!("{}_", program_name);
    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(file_name) = path.file_name() {
            let file_name_str = file_name.to_string_lossy();
            if file_name_str.starts_with(&prefix) && file_name_str.ends_with(".log") {
                if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
                    log_files.push((path, modified));
                }
            }
        }
    }

    if log_files.len() > max_files {
        // newest first; ties broken by name so the timestamped names decide
        log_files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

        for (path, _) in log_files.iter().skip(max_files) {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = ?path, error = %e, "Failed to remove old log file");
            } else {
                tracing::debug!(path = ?path, "Removed old log file");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.max_files, 30);
        assert_eq!(config.level, Level::INFO);
        assert!(config.console);
    }

    #[test]
    fn test_log_config_builder() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::new()
            .with_log_dir(temp_dir.path())
            .with_max_files(3)
            .with_level(Level::DEBUG)
            .with_console(false);

        assert_eq!(config.log_dir, temp_dir.path());
        assert_eq!(config.max_files, 3);
        assert_eq!(config.level, Level::DEBUG);
        assert!(!config.console);
    }

    #[test]
    fn test_run_log_file_name_pattern() {
        let ts = Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(
            run_log_file_name("heic_convert", ts),
            "heic_convert_20260307_090501.log"
        );
    }

    #[test]
    fn test_run_log_writes_and_flushes_on_close() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::new()
            .with_log_dir(temp_dir.path().join("logs"))
            .with_console(false);

        let log = RunLog::open("unit_test", &config).unwrap();
        let path = log.path().unwrap().to_path_buf();
        log.in_scope(|| tracing::info!(files = 3, "milestone reached"));
        log.close();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("milestone reached"));
        assert!(content.contains("files=3"));
    }

    #[test]
    fn test_run_log_respects_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::new()
            .with_log_dir(temp_dir.path())
            .with_console(false);

        let log = RunLog::open("level_test", &config).unwrap();
        let path = log.path().unwrap().to_path_buf();
        log.in_scope(|| {
            tracing::debug!("hidden detail");
            tracing::info!("visible milestone");
        });
        log.close();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("visible milestone"));
        assert!(!content.contains("hidden detail"));
    }

    #[test]
    fn test_inherit_has_no_file() {
        let log = RunLog::inherit();
        assert!(log.path().is_none());
        assert_eq!(log.in_scope(|| 7), 7);
    }

    #[test]
    fn test_cleanup_old_logs() {
        let temp_dir = TempDir::new().unwrap();
        let program_name = "test_program";

        for i in 0..10 {
            let file_path = temp_dir
                .path()
                .join(format!("{}_2026010{}_000000.log", program_name, i));
            fs::write(&file_path, format!("log content {}", i)).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        fs::write(temp_dir.path().join("other_tool_20260101_000000.log"), "x").unwrap();

        cleanup_old_logs(temp_dir.path(), program_name, 3).unwrap();

        let remaining_files: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(program_name))
            .collect();

        assert_eq!(remaining_files.len(), 3);
        assert!(temp_dir.path().join("other_tool_20260101_000000.log").exists());
    }
}
