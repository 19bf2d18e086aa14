//! Runner that replays a recorded sequence of callbacks
//!
//! Scripts are JSON lines. Each line is either a runner callback
//! (`log`, `output`, `unknown`) or a control step (`confirm`, `fail`).
//! Blank lines and lines starting with `#` are skipped.

use super::{CommandRunner, RunRequest};
use crate::frontend::Frontend;
use pkgfront_errors::{Error, RunnerError};
use pkgfront_events::RunnerEvent;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Steps that steer the replay instead of producing a callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptControl {
    /// Ask the operator; a negative answer aborts the script
    Confirm {
        prompt: String,
        #[serde(default = "default_confirm")]
        default: bool,
    },
    /// Stop with a synchronous failure
    Fail {
        message: String,
        #[serde(default)]
        user_info: Option<String>,
    },
}

fn default_confirm() -> bool {
    true
}

/// One line of a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Event(RunnerEvent),
    Control(ScriptControl),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptRunner {
    steps: Vec<ScriptStep>,
}

impl ScriptRunner {
    #[must_use]
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self { steps }
    }

    /// Parse a JSON-lines script
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::InvalidScript` naming the first line that is
    /// not a known step.
    pub fn parse(script: &str) -> Result<Self, RunnerError> {
        let steps = script
            .lines()
            .enumerate()
            .filter(|(_, line)| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| RunnerError::InvalidScript {
                    line: index + 1,
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<ScriptStep>, _>>()?;
        Ok(Self { steps })
    }

    /// Read and parse a script file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid script.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        Ok(Self::parse(&contents)?)
    }

    #[must_use]
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }
}

impl CommandRunner for ScriptRunner {
    fn invoke(&mut self, request: &RunRequest, frontend: &mut dyn Frontend) -> Result<(), RunnerError> {
        tracing::debug!(kind = %request.kind, steps = self.steps.len(), "replaying script");
        for step in &self.steps {
            match step {
                ScriptStep::Event(event) => frontend.handle_event(event.clone()),
                ScriptStep::Control(ScriptControl::Confirm { prompt, default }) => {
                    if !frontend.user_confirm(prompt, *default) {
                        return Err(RunnerError::Declined {
                            prompt: prompt.clone(),
                        });
                    }
                }
                ScriptStep::Control(ScriptControl::Fail { message, user_info }) => {
                    return Err(RunnerError::failed(message.clone(), user_info.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_events_and_controls() {
        let script = ScriptRunner::parse(
            r#"
# install replay
{"type":"log","message":"."}
{"type":"confirm","prompt":"Continue?","default":false}
{"type":"output","command":"install","payload":{"data":"Install complete"}}
{"type":"fail","message":"Channel not found"}
"#,
        )
        .unwrap();
        assert_eq!(
            script.steps(),
            &[
                ScriptStep::Event(RunnerEvent::log(".")),
                ScriptStep::Control(ScriptControl::Confirm {
                    prompt: "Continue?".into(),
                    default: false
                }),
                ScriptStep::Event(RunnerEvent::output(
                    "install",
                    json!({"data": "Install complete"})
                )),
                ScriptStep::Control(ScriptControl::Fail {
                    message: "Channel not found".into(),
                    user_info: None
                }),
            ]
        );
    }

    #[test]
    fn reports_bad_line_number() {
        let err = ScriptRunner::parse("{\"type\":\"log\",\"message\":\"ok\"}\n{\"type\":\"bogus\"}")
            .unwrap_err();
        assert!(matches!(err, RunnerError::InvalidScript { line: 2, .. }));
    }
}
