//! Logging configuration and setup.

use std::fmt as std_fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, MakeWriter, format::FmtSpan};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::{TelemetryError, TelemetryResult};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn init_err<E: std_fmt::Display>(e: E) -> TelemetryError {
    TelemetryError::InitError(e.to_string())
}

/// Log format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human-friendly.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// Structured JSON.
    Json,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(TelemetryError::ConfigError(format!(
                "unknown log format '{other}'"
            ))),
        }
    }
}

impl std_fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        })
    }
}

/// Log output target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Standard output.
    Stdout,
    /// Standard error. Keeps stdout clean for command output.
    #[default]
    Stderr,
    /// Daily-rotated files in this directory.
    File(PathBuf),
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Base level filter (e.g. `"info"`).
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Output target.
    #[serde(default)]
    pub target: LogTarget,
    /// File name prefix when logging to files.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Per-crate overrides (e.g. `arbor_resolver=debug`).
    #[serde(default)]
    pub directives: Vec<String>,
    /// Include timestamps.
    #[serde(default = "default_true")]
    pub timestamps: bool,
    /// Use ANSI colors.
    #[serde(default = "default_true")]
    pub ansi: bool,
    /// Emit span open/close events.
    #[serde(default)]
    pub span_events: bool,
}

fn default_level() -> String {
    "warn".to_owned()
}

fn default_file_prefix() -> String {
    "arbor".to_owned()
}

fn default_true() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            file_prefix: default_file_prefix(),
            directives: Vec::new(),
            timestamps: true,
            ansi: true,
            span_events: false,
        }
    }
}

impl LogConfig {
    /// Config at `level`, defaults otherwise.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    /// Set the format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the target.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Log to daily files in `directory`. Disables colors.
    #[must_use]
    pub fn with_file_logging(mut self, directory: impl Into<PathBuf>) -> Self {
        self.target = LogTarget::File(directory.into());
        self.ansi = false;
        self
    }

    /// Add a directive.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Drop timestamps.
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    /// Disable colors.
    #[must_use]
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }

    /// Emit span open/close events.
    #[must_use]
    pub fn with_span_events(mut self) -> Self {
        self.span_events = true;
        self
    }

    /// Build from the `[logging]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::ConfigError`] for an unknown format or
    /// target, or a file target without a directory.
    #[cfg(feature = "config")]
    pub fn from_section(section: &arbor_config::LoggingSection) -> TelemetryResult<Self> {
        let mut config = Self::new(section.level.clone()).with_format(section.format.parse()?);
        for directive in &section.directives {
            config = config.with_directive(directive.clone());
        }

        config = match (section.target.as_str(), &section.directory) {
            ("stderr", _) => config.with_target(LogTarget::Stderr),
            ("stdout", _) => config.with_target(LogTarget::Stdout),
            ("file", Some(directory)) => config.with_file_logging(directory),
            ("file", None) => {
                return Err(TelemetryError::ConfigError(
                    "file logging requires a directory".to_owned(),
                ));
            },
            (other, _) => {
                return Err(TelemetryError::ConfigError(format!(
                    "unknown log target '{other}'"
                )));
            },
        };

        if !section.timestamps {
            config = config.without_timestamps();
        }
        if !section.ansi {
            config = config.without_ansi();
        }
        if section.span_events {
            config = config.with_span_events();
        }
        Ok(config)
    }

    fn build_filter(&self) -> TelemetryResult<EnvFilter> {
        let mut filter = EnvFilter::try_new(&self.level)
            .map_err(|e| TelemetryError::ConfigError(e.to_string()))?;

        for directive in &self.directives {
            filter = filter.add_directive(directive.parse().map_err(
                |e: tracing_subscriber::filter::ParseError| {
                    TelemetryError::ConfigError(format!("directive '{directive}': {e}"))
                },
            )?);
        }

        Ok(filter)
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn layer<W>(&self, writer: W) -> BoxedLayer
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let base = fmt::layer::<Registry>()
            .with_writer(writer)
            .with_ansi(self.ansi)
            .with_span_events(self.span_events());

        match (self.format, self.timestamps) {
            (LogFormat::Json, true) => base.json().boxed(),
            (LogFormat::Json, false) => base.json().without_time().boxed(),
            (LogFormat::Pretty, true) => base.pretty().boxed(),
            (LogFormat::Pretty, false) => base.pretty().without_time().boxed(),
            (LogFormat::Compact, true) => base.compact().boxed(),
            (LogFormat::Compact, false) => base.compact().without_time().boxed(),
        }
    }

    fn build_layer(&self) -> TelemetryResult<BoxedLayer> {
        match &self.target {
            LogTarget::Stdout => Ok(self.layer(std::io::stdout)),
            LogTarget::Stderr => Ok(self.layer(std::io::stderr)),
            LogTarget::File(dir) => {
                std::fs::create_dir_all(dir)?;
                let appender = RollingFileAppender::builder()
                    .rotation(Rotation::DAILY)
                    .filename_prefix(&self.file_prefix)
                    .filename_suffix("log")
                    .build(dir)
                    .map_err(init_err)?;
                Ok(self.layer(appender))
            },
        }
    }
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::ConfigError`] for a bad level or directive,
/// [`TelemetryError::IoError`] if the log directory cannot be created, and
/// [`TelemetryError::InitError`] if a subscriber is already installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.build_filter()?;
    let layer = config.build_layer()?;

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(init_err)
}
