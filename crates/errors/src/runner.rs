//! Command runner failure types
//!
//! A runner reports a synchronous failure instead of streaming events when
//! it cannot carry out the requested operation at all (unknown channel,
//! executable missing, script aborted). The controller consumes the
//! `message()` / `user_info()` pair to populate the log.

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum RunnerError {
    #[error("{message}")]
    Failed {
        message: String,
        user_info: Option<String>,
    },

    #[error("failed to launch {program}: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("{program} exited with status {code}")]
    ExitStatus {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("invalid script line {line}: {message}")]
    InvalidScript { line: usize, message: String },

    #[error("operation declined by user: {prompt}")]
    Declined { prompt: String },
}

impl RunnerError {
    /// Plain failure with a message and optional auxiliary details
    pub fn failed(message: impl Into<String>, user_info: Option<String>) -> Self {
        Self::Failed {
            message: message.into(),
            user_info,
        }
    }

    /// Primary failure message shown in the action label and the log
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Auxiliary user-facing details, when the runner provided any
    #[must_use]
    pub fn user_info(&self) -> Option<&str> {
        match self {
            Self::Failed { user_info, .. } => user_info.as_deref(),
            Self::ExitStatus { stderr, .. } if !stderr.trim().is_empty() => Some(stderr.trim()),
            _ => None,
        }
    }
}

impl UserFacingError for RunnerError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SpawnFailed { .. } => {
                Some("Check that the package manager is installed or set [runner] program.")
            }
            Self::InvalidScript { .. } => Some("Each script line must be one JSON object."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ExitStatus { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Failed { .. } => "runner.failed",
            Self::SpawnFailed { .. } => "runner.spawn_failed",
            Self::ExitStatus { .. } => "runner.exit_status",
            Self::InvalidScript { .. } => "runner.invalid_script",
            Self::Declined { .. } => "runner.declined",
        })
    }
}
