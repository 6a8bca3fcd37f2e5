//! Runtime settings, read from the environment.
//!
//! | Variable               | Default                 |
//! |------------------------|-------------------------|
//! | `CARDIO_API_URL`       | `http://localhost:8000` |
//! | `CARDIO_TIMEOUT_SECS`  | `10`                    |
//! | `CARDIO_LOG_MODE`      | `auto`                  |
//! | `CARDIO_LOG_FILE`      | `cardiopredict.log`     |

use std::path::PathBuf;
use std::time::Duration;

use crate::CardioError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_FILE: &str = "cardiopredict.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when attached to a terminal, stdout otherwise
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> crate::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            other => Err(CardioError::Config(format!(
                "CARDIO_LOG_MODE must be auto, file or stdout (got {other:?})"
            ))),
        }
    }

    /// Resolve `Auto` against whether stdout is interactive.
    ///
    /// Logging to the terminal would corrupt the TUI's alternate screen.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub request_timeout: Duration,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Settings {
    /// Load from process environment.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset or blank keys use defaults.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(url) = get("CARDIO_API_URL") {
            settings.api_url = url.trim().to_string();
        }

        if let Some(raw) = get("CARDIO_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                CardioError::Config(format!("CARDIO_TIMEOUT_SECS is not a number: {raw:?}"))
            })?;
            if secs == 0 {
                return Err(CardioError::Config(
                    "CARDIO_TIMEOUT_SECS must be at least 1".to_string(),
                ));
            }
            settings.request_timeout = Duration::from_secs(secs);
        }

        if let Some(mode) = get("CARDIO_LOG_MODE") {
            settings.log_mode = LogMode::parse(&mode)?;
        }

        if let Some(path) = get("CARDIO_LOG_FILE") {
            settings.log_file = PathBuf::from(path);
        }

        Ok(settings)
    }
}
