//! Logging configuration for FlatQL
//!
//! Statement and storage events are emitted through `tracing`; this module
//! installs a subscriber for them. `FLATQL_LOG` takes precedence over
//! `RUST_LOG`, which takes precedence over the configured level.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable read before `RUST_LOG`
pub const LOG_ENV: &str = "FLATQL_LOG";

const DEFAULT_LOG_FILE: &str = "flatql.log";

/// Log output destination
#[derive(Debug, Clone)]
pub enum LogOutput {
    /// Output to stdout
    Stdout,
    /// Output to stderr, keeping stdout free for query results
    Stderr,
    /// Output to a file with daily rotation
    File(PathBuf),
    /// Output to both stderr and file
    Both(PathBuf),
}

/// Log format style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line format (default)
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level filter
    pub level: String,
    /// Output destination
    pub output: LogOutput,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Create config with info level and stdout output
    pub fn info() -> Self {
        Self::default()
    }

    /// Create config with debug level
    pub fn debug() -> Self {
        Self {
            level: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Create config with warn level
    pub fn warn() -> Self {
        Self {
            level: "warn".to_string(),
            ..Default::default()
        }
    }

    /// Set log output to stderr
    pub fn with_stderr(mut self) -> Self {
        self.output = LogOutput::Stderr;
        self
    }

    /// Set log output to file with rotation
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Set log output to both stderr and file
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set log level filter
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    fn env_filter(&self) -> EnvFilter {
        std::env::var(LOG_ENV)
            .ok()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .or_else(|| EnvFilter::try_new(&self.level).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }

    /// Initialize global logging with this configuration
    ///
    /// Returns a guard that must be kept alive while logging to a file.
    /// When the guard is dropped, the file writer thread shuts down.
    /// Calling this a second time in one process leaves the first
    /// subscriber in place.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use flatql::logging::LogConfig;
    ///
    /// // Keep the guard alive for the lifetime of your application
    /// let _guard = LogConfig::warn().with_stderr().init();
    /// ```
    pub fn init(self) -> Option<WorkerGuard> {
        let env_filter = self.env_filter();
        let registry = tracing_subscriber::registry().with(env_filter);

        match self.output {
            LogOutput::Stdout => {
                let _ = match self.format {
                    LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
                    LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                };
                None
            }
            LogOutput::Stderr => {
                let layer = fmt::layer().with_writer(std::io::stderr);
                let _ = match self.format {
                    LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
                    LogFormat::Compact => registry.with(layer.compact()).try_init(),
                };
                None
            }
            LogOutput::File(path) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(&path));
                let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

                let _ = match self.format {
                    LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
                    LogFormat::Compact => registry.with(layer.compact()).try_init(),
                };
                Some(guard)
            }
            LogOutput::Both(path) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(&path));

                // one format for both writers keeps the layer types concrete
                let _ = registry
                    .with(fmt::layer().with_writer(std::io::stderr).compact())
                    .with(fmt::layer().with_writer(non_blocking).with_ansi(false).compact())
                    .try_init();

                Some(guard)
            }
        }
    }
}

fn file_appender(path: &Path) -> tracing_appender::rolling::RollingFileAppender {
    tracing_appender::rolling::daily(
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(".")),
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_LOG_FILE),
    )
}
