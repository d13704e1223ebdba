//! Error types for the speech reminder service.
//!
//! Configuration problems are recovered by falling back to defaults, notifier
//! failures are logged inside their own task, and calendar source failures
//! surface to the caller as a [`SchedulerError`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A single problem found while validating the preferences file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigProblem {
    #[error("unsupported language code '{0}'")]
    UnknownLanguage(String),

    #[error("alert threshold {0} must be a positive number of minutes")]
    InvalidThreshold(i64),

    #[error("at least one alert threshold is required")]
    NoThresholds,

    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: i64 },

    #[error("exit character '{0}' must be exactly one character")]
    InvalidExitCharacter(String),
}

/// Failure to read or parse the preferences sources.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load preferences: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid preferences: {}", join_problems(.0))]
    Invalid(Vec<ConfigProblem>),
}

fn join_problems(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by a calendar source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// OAuth credentials could not be read or the token flow failed
    #[error("calendar authentication failed: {0}")]
    Auth(String),

    /// The calendar API request failed or returned unusable data
    #[error("calendar request failed: {0}")]
    Request(String),

    /// The configured calendar id is unknown or not shared with the account
    #[error("calendar '{0}' was not found")]
    NoCalendar(String),
}

/// Errors raised by a notifier while announcing an alert.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("audio playback failed: {0}")]
    Playback(String),

    #[error("audio staging failed: {0}")]
    Io(#[from] std::io::Error),
}

/// When a calendar fetch happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Startup,
    Refresh,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPhase::Startup => f.write_str("startup"),
            FetchPhase::Refresh => f.write_str("refresh"),
        }
    }
}

/// Errors that stop the alert scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("calendar fetch failed during {phase}")]
    Fetch {
        phase: FetchPhase,
        #[source]
        source: SourceError,
    },
}

impl SchedulerError {
    pub fn fetch(phase: FetchPhase, source: SourceError) -> Self {
        SchedulerError::Fetch { phase, source }
    }
}

/// Problems with the `--dir` working directory.
#[derive(Debug, Error)]
pub enum WorkingDirError {
    #[error("working directory {} does not exist or is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot change into working directory {}: {}", .path.display(), .source)]
    Enter {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_fetch_error_keeps_source() {
        let err = SchedulerError::fetch(FetchPhase::Refresh, SourceError::Request("timeout".into()));
        assert_eq!(err.to_string(), "calendar fetch failed during refresh");
        let source = err.source().expect("source should be attached");
        assert_eq!(source.to_string(), "calendar request failed: timeout");
    }

    #[test]
    fn test_missing_calendar_names_the_id() {
        let err = SourceError::NoCalendar("team@example.com".into());
        assert_eq!(err.to_string(), "calendar 'team@example.com' was not found");
    }

    #[test]
    fn test_invalid_config_lists_problems() {
        let err = ConfigError::Invalid(vec![
            ConfigProblem::NoThresholds,
            ConfigProblem::UnknownLanguage("xx".into()),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid preferences: at least one alert threshold is required; unsupported language code 'xx'"
        );
    }
}
