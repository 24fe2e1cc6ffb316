//! Rolling file log for the StickyBoard core.
//!
//! # Responsibility
//! - Start the file logger described by the `[logging]` config section.
//! - Record panics (location only) before the previous hook runs.
//!
//! # Invariants
//! - One logger per process. Starting again with the same level and
//!   directory is a no-op; any other settings are refused.
//! - Starting never panics.
//! - Events carry ids, counts and codes only. Note text and panic payloads
//!   are never written.

use crate::config::LoggingConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_BASENAME: &str = "stickyboard";
const BYTES_PER_MB: u64 = 1024 * 1024;

static ACTIVE: OnceCell<Running> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct Running {
    settings: ActiveLogging,
    _handle: LoggerHandle,
}

/// Level and directory of the running logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLogging {
    pub level: &'static str,
    pub dir: PathBuf,
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    RelativeDir(PathBuf),
    CreateDir { dir: PathBuf, source: std::io::Error },
    Backend(String),
    /// A logger with different settings is already running.
    AlreadyStarted(ActiveLogging),
}

impl LoggingError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedLevel(_) => "log_level_unsupported",
            Self::RelativeDir(_) => "log_dir_relative",
            Self::CreateDir { .. } => "log_dir_create_failed",
            Self::Backend(_) => "log_backend_failed",
            Self::AlreadyStarted(_) => "log_already_started",
        }
    }
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeDir(dir) => {
                write!(f, "log directory must be absolute, got `{}`", dir.display())
            }
            Self::CreateDir { dir, source } => {
                write!(f, "cannot create log directory `{}`: {source}", dir.display())
            }
            Self::Backend(message) => write!(f, "log backend failed to start: {message}"),
            Self::AlreadyStarted(active) => write!(
                f,
                "logging already started at level `{}` in `{}`",
                active.level,
                active.dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Level used when the config does not name one: `debug` in debug builds,
/// `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Starts the file logger from the `[logging]` section.
///
/// Returns `Ok(false)` when no directory is configured; logging stays off.
pub fn start_logging(config: &LoggingConfig) -> Result<bool, LoggingError> {
    let Some(dir) = &config.dir else {
        return Ok(false);
    };
    let wanted = ActiveLogging {
        level: level_name(&config.level)?,
        dir: absolute_dir(dir)?,
    };

    if let Some(running) = ACTIVE.get() {
        return same_settings(&running.settings, &wanted).map(|()| true);
    }
    let running = ACTIVE.get_or_try_init(|| launch(&wanted, config))?;
    same_settings(&running.settings, &wanted).map(|()| true)
}

/// Bridge entry point: starts logging at `level` in the absolute `log_dir`.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let config = LoggingConfig {
        level: level.to_string(),
        dir: Some(PathBuf::from(log_dir.trim())),
        ..LoggingConfig::default()
    };
    start_logging(&config).map(|_| ())
}

/// Settings of the running logger, if any.
pub fn active_logging() -> Option<ActiveLogging> {
    ACTIVE.get().map(|running| running.settings.clone())
}

fn launch(wanted: &ActiveLogging, config: &LoggingConfig) -> Result<Running, LoggingError> {
    std::fs::create_dir_all(&wanted.dir).map_err(|source| LoggingError::CreateDir {
        dir: wanted.dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_str(wanted.level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(wanted.dir.as_path())
                .basename(LOG_BASENAME),
        )
        .rotate(
            Criterion::Size(config.max_file_mb.max(1) * BYTES_PER_MB),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.keep_files.max(1)),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    record_panics();
    info!(
        "event=logging_start module=logging status=ok app=stickyboard version={} level={} dir={}",
        env!("CARGO_PKG_VERSION"),
        wanted.level,
        wanted.dir.display()
    );

    Ok(Running {
        settings: wanted.clone(),
        _handle: handle,
    })
}

fn same_settings(running: &ActiveLogging, wanted: &ActiveLogging) -> Result<(), LoggingError> {
    if running == wanted {
        Ok(())
    } else {
        Err(LoggingError::AlreadyStarted(running.clone()))
    }
}

fn level_name(level: &str) -> Result<&'static str, LoggingError> {
    let name = match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => return Err(LoggingError::UnsupportedLevel(level.trim().to_string())),
    };
    Ok(name)
}

fn absolute_dir(dir: &std::path::Path) -> Result<PathBuf, LoggingError> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Err(LoggingError::RelativeDir(dir.to_path_buf()))
    }
}

fn record_panics() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!("event=panic module=logging status=error app=stickyboard location={location}");
        previous(info);
    }));
}
