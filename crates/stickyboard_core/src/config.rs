//! Application configuration loaded from `stickyboard.toml`.
//!
//! # Invariants
//! - Every field has a default, so a missing or empty file equals
//!   `AppConfig::default()`.
//! - Unknown audience names are rejected at load time rather than at first use.

use crate::audience::AudienceMode;
use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "stickyboard.toml";
pub const DEFAULT_DATABASE_FILE: &str = "stickyboard.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidAudience(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidAudience(value) => {
                write!(f, "unknown audience `{value}`; expected professional|student")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidAudience(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory; logging stays off when unset.
    pub dir: Option<PathBuf>,
    /// Size at which the active file rotates.
    pub max_file_mb: u64,
    /// Rotated files kept on disk.
    pub keep_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
            max_file_mb: 10,
            keep_files: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    default_audience: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_audience: AudienceMode::default().as_str().to_string(),
        }
    }
}

impl UiConfig {
    /// Audience used for users without a stored preference.
    pub fn default_audience(&self) -> AudienceMode {
        AudienceMode::parse(&self.default_audience).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Parses configuration text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        if AudienceMode::parse(&config.ui.default_audience).is_none() {
            return Err(ConfigError::InvalidAudience(config.ui.default_audience));
        }
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Database path resolved against `base_dir` when relative.
    pub fn database_path(&self, base_dir: &Path) -> PathBuf {
        if self.database.path.is_absolute() {
            self.database.path.clone()
        } else {
            base_dir.join(&self.database.path)
        }
    }
}
