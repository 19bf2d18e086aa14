//! Callbacks a command runner makes while an operation executes
//!
//! The runner has no fixed schema for what it reports: it logs free text
//! and hands over whatever structured data its internal command produced.
//! `RunnerEvent` is the closed set of callback shapes the controller
//! accepts; `Unknown` is the single fallback for anything else.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One callback from the command runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunnerEvent {
    /// Plain log message
    Log {
        message: String,
        #[serde(default = "default_append_newline")]
        append_newline: bool,
    },

    /// Structured output of a command; `command` is absent for free-form data
    Output {
        #[serde(default)]
        command: Option<String>,
        #[serde(default)]
        payload: Value,
    },

    /// A callback the controller has no dedicated handler for
    Unknown {
        method: String,
        #[serde(default)]
        args: Vec<Value>,
    },
}

fn default_append_newline() -> bool {
    true
}

impl RunnerEvent {
    /// Log message terminated by a line break
    pub fn log(message: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
            append_newline: true,
        }
    }

    /// Log message continuing the current line
    pub fn log_inline(message: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
            append_newline: false,
        }
    }

    /// Structured output attributed to a command
    pub fn output(command: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self::Output {
            command: Some(command.into()),
            payload: payload.into(),
        }
    }

    /// Structured output without a command
    pub fn data(payload: impl Into<Value>) -> Self {
        Self::Output {
            command: None,
            payload: payload.into(),
        }
    }

    /// Short name of the callback shape
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Log { .. } => "log",
            Self::Output { .. } => "output",
            Self::Unknown { method, .. } => method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn log_defaults_to_newline() {
        let event: RunnerEvent = serde_json::from_str(r#"{"type":"log","message":"."}"#).unwrap();
        assert_eq!(event, RunnerEvent::log("."));
    }

    #[test]
    fn output_without_command() {
        let event: RunnerEvent =
            serde_json::from_str(r#"{"type":"output","payload":"foo is up to date"}"#).unwrap();
        assert_eq!(event, RunnerEvent::data("foo is up to date"));
    }

    #[test]
    fn output_with_record_payload() {
        let event = RunnerEvent::output("install", json!({"data": "Install complete"}));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["command"], "install");
        assert_eq!(json["payload"]["data"], "Install complete");
    }
}
