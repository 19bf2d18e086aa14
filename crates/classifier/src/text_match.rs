//! Substring and shape matching over untyped runner output
//!
//! The runner has no event protocol, so these rules key off message
//! wording and payload shapes. They must stay byte-for-byte compatible with
//! what the package manager prints.

use pkgfront_events::RunnerEvent;
use serde_json::Value;

use crate::payload::{nested_data_lines, render_payload_lines, result_text, value_text, value_type};
use crate::{Classification, ClassifyContext, EventCategory, EventClassifier};

/// Signature of a dependency failure the package manager cannot recover from
const DEPENDENCY_FAILURE: &str = "is required by installed package";
/// Lowercase error marker in log messages and free-form output
const ERROR_MARKER: &str = "error:";
/// Lowercase marker of a no-op upgrade
const UP_TO_DATE: &str = "is up to date";

const TICK_PERCENT: u32 = 1;
const MILESTONE_PERCENT: u32 = 10;

/// Default classifier: the matching rules the package manager's output
/// has always been read with
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMatchClassifier;

impl TextMatchClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn classify_log(message: &str, append_newline: bool) -> Classification {
        let is_tick = message == "." || !append_newline;
        let (category, delta) = if is_tick {
            (EventCategory::ProgressTick, TICK_PERCENT)
        } else {
            (EventCategory::Milestone, MILESTONE_PERCENT)
        };

        let mut classification = Classification::new(category);
        if message.contains(DEPENDENCY_FAILURE) || contains_ci(message, ERROR_MARKER) {
            classification = classification.serious_error(message.trim());
        }
        classification.advance(delta).log(message, append_newline)
    }

    fn classify_output(
        command: Option<&str>,
        payload: &Value,
        ctx: &ClassifyContext<'_>,
    ) -> Classification {
        let package = ctx.package.unwrap_or("package");
        match command {
            Some("install" | "upgrade" | "upgrade-all") => {
                Classification::new(EventCategory::Completion)
                    .action(format!("Installation of {package} done"))
                    .log_line(result_text(payload))
                    .finish()
            }
            Some("uninstall") => {
                if ctx.has_serious_error {
                    Classification::new(EventCategory::SeriousError)
                        .action(format!("Error uninstalling {package}"))
                        .expand_log()
                        .finish()
                } else {
                    Classification::new(EventCategory::Completion)
                        .action(format!("Uninstallation of {package} ok"))
                        .log_line("Uninstall ok")
                        .finish()
                }
            }
            Some("channel-discover" | "channel-delete") => {
                let text = result_text(payload);
                Classification::new(EventCategory::Completion)
                    .action(text.clone())
                    .log_line(text)
                    .finish()
            }
            Some("build") => render_payload_lines(payload)
                .into_iter()
                .fold(Classification::new(EventCategory::Informational), |c, line| {
                    c.log_line(line)
                }),
            Some(other) => render_payload_lines(payload).into_iter().fold(
                Classification::new(EventCategory::Diagnostic)
                    .diagnostic(format!("unsupported command in output data: {other}")),
                |c, line| c.log_line(line),
            ),
            None => Self::classify_free_form(payload),
        }
    }

    fn classify_free_form(payload: &Value) -> Classification {
        match payload {
            Value::String(text) => {
                let base = Classification::new(EventCategory::Informational)
                    .action(text.clone())
                    .log_line(text.clone());
                if contains_ci(text, UP_TO_DATE) {
                    Classification {
                        category: EventCategory::Completion,
                        ..base
                    }
                    .finish()
                } else if contains_ci(text, ERROR_MARKER) {
                    base.serious_error(text.trim()).finish()
                } else {
                    base
                }
            }
            Value::Object(record) if record.contains_key("headline") => {
                let headline = record.get("headline").map(value_text).unwrap_or_default();
                let mut classification = Classification::new(EventCategory::Informational)
                    .action(headline.clone())
                    .log_line(format!("!!!{headline}!!!"));
                if contains_ci(&headline, "error") {
                    classification = classification.serious_error(headline).finish();
                }
                nested_data_lines(record.get("data"))
                    .into_iter()
                    .fold(classification, |c, line| c.log_line(line))
            }
            other => Classification::new(EventCategory::Diagnostic)
                .log_line(format!("unhandled payload shape: {}", value_type(other))),
        }
    }

    fn classify_unknown(method: &str, args: &[Value]) -> Classification {
        let header = format!("unhandled callback: {method} with {} arguments", args.len());
        args.iter().enumerate().fold(
            Classification::new(EventCategory::Diagnostic).log_line(header),
            |c, (index, arg)| {
                c.log_line(format!(
                    "   arg:{index}:{}::{}",
                    value_type(arg),
                    value_text(arg)
                ))
            },
        )
    }
}

impl EventClassifier for TextMatchClassifier {
    fn classify(&self, event: &RunnerEvent, ctx: &ClassifyContext<'_>) -> Classification {
        let classification = match event {
            RunnerEvent::Log {
                message,
                append_newline,
            } => Self::classify_log(message, *append_newline),
            RunnerEvent::Output { command, payload } => {
                Self::classify_output(command.as_deref(), payload, ctx)
            }
            RunnerEvent::Unknown { method, args } => Self::classify_unknown(method, args),
        };
        tracing::trace!(
            kind = event.kind(),
            category = ?classification.category,
            effects = classification.effects.len(),
            "classified runner event"
        );
        classification
    }
}

fn contains_ci(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowercase_needle)
}
