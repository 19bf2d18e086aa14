//! Runner that drives an external package manager executable

use super::{CommandRunner, RunRequest};
use crate::frontend::Frontend;
use pkgfront_errors::RunnerError;
use pkgfront_events::RunnerEvent;
use pkgfront_types::OperationKind;
use serde_json::{json, Value};
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;

/// Spawns the package manager once per operation and streams its output.
///
/// Every stdout line becomes a log callback, except the last one of a
/// command whose result is that line: it is held back and reported inside
/// the structured result the package manager's own frontend would have
/// received, so the classifier sees the same terminal events either way.
/// Output is decoded lossily; the package manager prints whatever encoding
/// its package descriptions use.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    extra_args: Vec<String>,
}

impl ProcessRunner {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    /// Arguments placed before the command name
    #[must_use]
    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument vector for one request
    #[must_use]
    pub fn argv(&self, request: &RunRequest) -> Vec<String> {
        let mut argv = self.extra_args.clone();
        argv.push(request.command().to_string());
        argv.extend(request.arguments());
        argv
    }

    /// Whether the command's structured result is its last output line
    fn result_is_last_line(kind: OperationKind) -> bool {
        matches!(
            kind,
            OperationKind::Install | OperationKind::ChannelDiscover | OperationKind::ChannelDelete
        )
    }

    fn terminal_event(kind: OperationKind, last_line: Option<String>) -> Option<RunnerEvent> {
        let last = last_line.unwrap_or_default();
        match kind {
            OperationKind::Install => Some(RunnerEvent::output(
                kind.runner_command(),
                json!({ "data": last }),
            )),
            OperationKind::Uninstall => Some(RunnerEvent::output(kind.runner_command(), Value::Null)),
            OperationKind::ChannelDiscover | OperationKind::ChannelDelete => {
                Some(RunnerEvent::output(kind.runner_command(), last))
            }
            OperationKind::ChannelUpdate | OperationKind::Generic => None,
        }
    }

    /// Forward stdout lines, returning the last non-empty one unlogged.
    ///
    /// Blank lines after it are dropped.
    fn stream_stdout(
        stdout: impl Read,
        frontend: &mut dyn Frontend,
    ) -> io::Result<Option<String>> {
        let mut reader = BufReader::new(stdout);
        let mut buffer = Vec::new();
        let mut held: Option<String> = None;
        let mut blank_after_held = 0usize;
        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                return Ok(held);
            }
            let line = decode_line(&buffer);
            if line.trim().is_empty() {
                if held.is_some() {
                    blank_after_held += 1;
                } else {
                    frontend.log(&line, true);
                }
                continue;
            }
            if let Some(previous) = held.replace(line.trim().to_string()) {
                frontend.log(&previous, true);
                for _ in 0..blank_after_held {
                    frontend.log("", true);
                }
            }
            blank_after_held = 0;
        }
    }
}

/// One output line without its terminator, invalid UTF-8 replaced
fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new("pear")
    }
}

impl CommandRunner for ProcessRunner {
    fn invoke(&mut self, request: &RunRequest, frontend: &mut dyn Frontend) -> Result<(), RunnerError> {
        if request.kind == OperationKind::Generic {
            return Err(RunnerError::failed(
                "generic runs have no package manager command",
                None,
            ));
        }

        let argv = self.argv(request);
        tracing::debug!(program = %self.program, ?argv, "spawning package manager");

        let mut child = Command::new(&self.program)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RunnerError::SpawnFailed {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        // Drain stderr on its own thread so a chatty child cannot block on a full pipe
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buffer = Vec::new();
                let _ = stderr.read_to_end(&mut buffer);
                String::from_utf8_lossy(&buffer).into_owned()
            })
        });

        let streamed = match child.stdout.take() {
            Some(stdout) => Self::stream_stdout(stdout, frontend),
            None => Ok(None),
        };
        let last_line = match streamed {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(program = %self.program, error = %e, "reading output failed");
                let _ = child.kill();
                let _ = child.wait();
                if let Some(reader) = stderr_reader {
                    let _ = reader.join();
                }
                return Err(RunnerError::failed(
                    format!("failed to read output of {}", self.program),
                    Some(e.to_string()),
                ));
            }
        };

        let status = child.wait().map_err(|e| RunnerError::failed(
            format!("failed to wait for {}", self.program),
            Some(e.to_string()),
        ))?;
        let stderr = stderr_reader
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();

        if !status.success() {
            tracing::error!(program = %self.program, code = ?status.code(), "package manager failed");
            if let Some(line) = &last_line {
                frontend.log(line, true);
            }
            return Err(RunnerError::ExitStatus {
                program: self.program.clone(),
                code: status.code().unwrap_or(-1),
                stderr,
            });
        }

        let result_line = if Self::result_is_last_line(request.kind) {
            last_line
        } else {
            if let Some(line) = &last_line {
                frontend.log(line, true);
            }
            None
        };

        // Warnings of a successful run
        for line in stderr.lines().filter(|line| !line.trim().is_empty()) {
            frontend.log(line.trim_end(), true);
        }
        if let Some(event) = Self::terminal_event(request.kind, result_line) {
            frontend.handle_event(event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgfront_types::{InstallOptions, OperationTarget};

    #[test]
    fn argv_starts_with_extra_args() {
        let runner = ProcessRunner::new("pear").with_extra_args(["-c", "/etc/pear.conf"]);
        let request = RunRequest::new(
            OperationKind::ChannelDiscover,
            Some(OperationTarget::Channel("pear.example.com".into())),
            InstallOptions::default(),
        );
        assert_eq!(
            runner.argv(&request),
            vec!["-c", "/etc/pear.conf", "channel-discover", "pear.example.com"]
        );
    }

    #[test]
    fn terminal_events_match_commands() {
        assert_eq!(
            ProcessRunner::terminal_event(OperationKind::Install, Some("install ok".into())),
            Some(RunnerEvent::output("upgrade", json!({"data": "install ok"})))
        );
        assert_eq!(
            ProcessRunner::terminal_event(OperationKind::Uninstall, None),
            Some(RunnerEvent::output("uninstall", Value::Null))
        );
        assert_eq!(
            ProcessRunner::terminal_event(OperationKind::ChannelUpdate, Some("x".into())),
            None
        );
    }

    #[derive(Default)]
    struct Recorder(Vec<RunnerEvent>);

    impl Frontend for Recorder {
        fn handle_event(&mut self, event: RunnerEvent) {
            self.0.push(event);
        }

        fn user_confirm(&mut self, _prompt: &str, default: bool) -> bool {
            default
        }
    }

    #[test]
    fn last_line_is_held_back() {
        let mut recorder = Recorder::default();
        let output: &[u8] = b"downloading\r\n\ninstall ok\n\n";
        let last = ProcessRunner::stream_stdout(output, &mut recorder).unwrap();
        assert_eq!(last.as_deref(), Some("install ok"));
        assert_eq!(
            recorder.0,
            vec![RunnerEvent::log("downloading"), RunnerEvent::log("")]
        );
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut recorder = Recorder::default();
        let output: &[u8] = b"caf\xe9 menu\nFoo \xff\xfe done";
        let last = ProcessRunner::stream_stdout(output, &mut recorder).unwrap();
        assert_eq!(recorder.0, vec![RunnerEvent::log("caf\u{FFFD} menu")]);
        assert_eq!(last.as_deref(), Some("Foo \u{FFFD}\u{FFFD} done"));
    }

    #[test]
    fn only_result_commands_consume_the_last_line() {
        assert!(ProcessRunner::result_is_last_line(OperationKind::Install));
        assert!(ProcessRunner::result_is_last_line(OperationKind::ChannelDelete));
        assert!(!ProcessRunner::result_is_last_line(OperationKind::Uninstall));
        assert!(!ProcessRunner::result_is_last_line(OperationKind::ChannelUpdate));
    }
}
