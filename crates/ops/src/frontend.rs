//! Callback surface handed to command runners

use pkgfront_events::RunnerEvent;
use serde_json::Value;

/// What a command runner may call while it executes.
///
/// The runner receives this by argument for the duration of one
/// invocation; there is no ambient "current frontend". Every callback
/// shape funnels into [`handle_event`](Frontend::handle_event), except
/// confirmations, which need an answer.
pub trait Frontend {
    /// Deliver one runner callback
    fn handle_event(&mut self, event: RunnerEvent);

    /// Ask the operator a yes/no question and block until answered
    fn user_confirm(&mut self, prompt: &str, default: bool) -> bool;

    fn log(&mut self, message: &str, append_newline: bool) {
        self.handle_event(RunnerEvent::Log {
            message: message.to_string(),
            append_newline,
        });
    }

    fn output_data(&mut self, command: Option<&str>, payload: Value) {
        self.handle_event(RunnerEvent::Output {
            command: command.map(str::to_string),
            payload,
        });
    }

    fn unknown(&mut self, method: &str, args: Vec<Value>) {
        self.handle_event(RunnerEvent::Unknown {
            method: method.to_string(),
            args,
        });
    }
}

/// Answers confirmation requests on behalf of the operator
pub trait Prompter: Send {
    fn confirm(&mut self, prompt: &str, default: bool) -> bool;
}

/// Prompter that always takes the suggested default
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAnswer;

impl Prompter for DefaultAnswer {
    fn confirm(&mut self, _prompt: &str, default: bool) -> bool {
        default
    }
}

impl<F> Prompter for F
where
    F: FnMut(&str, bool) -> bool + Send,
{
    fn confirm(&mut self, prompt: &str, default: bool) -> bool {
        self(prompt, default)
    }
}
