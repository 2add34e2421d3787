//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for campus binaries.
//!
//! * console output (compact, ANSI) on by default;
//! * optional rolling log files written by a non-blocking worker, plain or JSON;
//! * an [`EnvFilter`] seeded from [`LoggerBuilder::level`] / [`LoggerBuilder::env_filter`]
//!   and overridable through `RUST_LOG`.
//!
//! ```rust
//! use campus_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("campus-server")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug)]
struct LoggerSettings {
    console: bool,
    directory: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            console: true,
            directory: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

/// Builder state: no name given yet.
#[derive(Debug)]
pub struct Unnamed;
/// Builder state: named.
#[derive(Debug)]
pub struct Named(String);
/// Builder state: console only.
#[derive(Debug)]
pub struct ConsoleOnly;
/// Builder state: file output configured.
#[derive(Debug)]
pub struct WithFiles;

mod sealed {
    pub trait State {}
}
impl sealed::State for Unnamed {}
impl sealed::State for Named {}
impl sealed::State for ConsoleOnly {}
impl sealed::State for WithFiles {}

/// Typestate builder: a name is mandatory, file-only knobs are available after [`Self::directory`].
#[derive(Debug)]
#[must_use = "call .init() to install the subscriber"]
pub struct LoggerBuilder<N: sealed::State = Unnamed, F: sealed::State = ConsoleOnly> {
    settings: LoggerSettings,
    name: N,
    files: PhantomData<F>,
}

impl<F: sealed::State> LoggerBuilder<Unnamed, F> {
    /// Names the process; also the prefix of the log files (`<name>.<date>.log`).
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder { settings: self.settings, name: Named(name.into()), files: PhantomData }
    }
}

impl<F: sealed::State> LoggerBuilder<Named, F> {
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Programmatic filter directives (e.g. `campus_erp=debug,tantivy=warn`).
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.settings.env_filter = Some(filter.into());
        self
    }

    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Enables rolling file output in `directory` (created when missing).
    pub fn directory(self, directory: impl Into<PathBuf>) -> LoggerBuilder<Named, WithFiles> {
        let mut settings = self.settings;
        settings.directory = Some(directory.into());
        LoggerBuilder { settings, name: self.name, files: PhantomData }
    }

    /// Installs the global subscriber.
    ///
    /// Keep the returned [`Logger`] alive: dropping it stops the file writer.
    ///
    /// # Errors
    /// [`LoggerError::Subscriber`] when a subscriber is already installed,
    /// [`LoggerError::InvalidConfiguration`] for empty names, zero file counts,
    /// unparsable filters or a configuration without any output.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let name = self.name.0;
        let settings = self.settings;
        settings.validate(&name)?;

        let filter = settings.env_filter()?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if settings.console {
            layers.push(fmt::layer().compact().with_ansi(true).boxed());
        }

        let guard = match &settings.directory {
            Some(directory) => {
                let (layer, guard) = settings.file_layer(&name, directory.clone())?;
                layers.push(layer);
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "no output enabled; turn on the console or configure a directory".into(),
                context: None,
            });
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(filter)
            .try_init()
            .context("Installing global subscriber")?;

        Ok(Logger { guard })
    }
}

impl LoggerBuilder<Named, WithFiles> {
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    /// Writes files as JSON lines.
    pub const fn json(mut self, enabled: bool) -> Self {
        self.settings.json = enabled;
        self
    }
}

impl LoggerSettings {
    fn validate(&self, name: &str) -> Result<(), LoggerError> {
        if name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "logger name cannot be empty".into(),
                context: None,
            });
        }
        if self.max_files == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }
        Ok(())
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.env_filter {
            None => Ok(builder.from_env_lossy()),
            Some(directives) => {
                builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
                    message: format!("invalid filter '{directives}': {e}").into(),
                    context: None,
                })
            },
        }
    }

    fn file_layer(
        &self,
        name: &str,
        directory: PathBuf,
    ) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
        std::fs::create_dir_all(&directory).map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some(format!("Creating log directory {}", directory.display()).into()),
        })?;

        let appender = RollingFileAppender::builder()
            .rotation(self.rotation.clone())
            .filename_prefix(name)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(self.max_files)
            .build(directory)?;

        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        let boxed = if self.json { layer.json().boxed() } else { layer.boxed() };

        Ok((boxed, guard))
    }
}

/// Handle to the installed logging system; owns the file writer guard.
#[must_use = "dropping the logger stops the background file writer"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: LoggerSettings::default(), name: Unnamed, files: PhantomData }
    }

    /// `true` when log files are being written.
    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers");
        }
    }
}
