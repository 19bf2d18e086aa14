#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Classification of command runner callbacks
//!
//! A classifier looks at one [`RunnerEvent`] and decides what it means for
//! the run: a progress tick, a milestone, a serious error, the end of the
//! operation. The decision is returned as an ordered list of [`Effect`]s;
//! applying them is the controller's job, so the matching strategy can be
//! replaced without touching run state.

mod payload;
mod text_match;

pub use payload::{render_payload_lines, value_text, value_type};
pub use text_match::TextMatchClassifier;

use pkgfront_events::RunnerEvent;
use serde::{Deserialize, Serialize};

/// What the run knows when an event arrives
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyContext<'a> {
    /// A serious error was already seen in this run
    pub has_serious_error: bool,
    /// Package the run operates on, used in action labels
    pub package: Option<&'a str>,
}

/// Semantic category of one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Fine-grained progress
    ProgressTick,
    /// Coarse progress step
    Milestone,
    /// Unrecoverable error detected
    SeriousError,
    /// The operation is over
    Completion,
    /// Logged, no other consequence
    Informational,
    /// Unexpected command or payload shape
    Diagnostic,
}

/// One state change implied by an event, applied in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    AppendLog { text: String, newline: bool },
    SetAction { text: String },
    AddPercentage { delta: u32 },
    MarkSeriousError { reason: String },
    ExpandLog,
    Finish,
    /// Reported to the operator and the tracing log, not the run log
    Diagnostic { message: String },
}

/// Outcome of classifying one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: EventCategory,
    pub effects: Vec<Effect>,
}

impl Classification {
    #[must_use]
    pub fn new(category: EventCategory) -> Self {
        Self {
            category,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn log_line(self, text: impl Into<String>) -> Self {
        self.log(text, true)
    }

    #[must_use]
    pub fn log(mut self, text: impl Into<String>, newline: bool) -> Self {
        self.effects.push(Effect::AppendLog {
            text: text.into(),
            newline,
        });
        self
    }

    #[must_use]
    pub fn action(mut self, text: impl Into<String>) -> Self {
        self.effects.push(Effect::SetAction { text: text.into() });
        self
    }

    #[must_use]
    pub fn advance(mut self, delta: u32) -> Self {
        self.effects.push(Effect::AddPercentage { delta });
        self
    }

    #[must_use]
    pub fn serious_error(mut self, reason: impl Into<String>) -> Self {
        self.category = EventCategory::SeriousError;
        self.effects.push(Effect::MarkSeriousError {
            reason: reason.into(),
        });
        self
    }

    #[must_use]
    pub fn expand_log(mut self) -> Self {
        self.effects.push(Effect::ExpandLog);
        self
    }

    #[must_use]
    pub fn finish(mut self) -> Self {
        self.effects.push(Effect::Finish);
        self
    }

    #[must_use]
    pub fn diagnostic(mut self, message: impl Into<String>) -> Self {
        self.effects.push(Effect::Diagnostic {
            message: message.into(),
        });
        self
    }

    /// Whether applying this classification ends the run
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.effects.contains(&Effect::Finish)
    }

    /// Whether applying this classification flags a serious error
    #[must_use]
    pub fn marks_serious_error(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, Effect::MarkSeriousError { .. }))
    }
}

/// Strategy that turns runner callbacks into classifications
pub trait EventClassifier: Send + Sync {
    fn classify(&self, event: &RunnerEvent, ctx: &ClassifyContext<'_>) -> Classification;
}

impl<T: EventClassifier + ?Sized> EventClassifier for Box<T> {
    fn classify(&self, event: &RunnerEvent, ctx: &ClassifyContext<'_>) -> Classification {
        (**self).classify(event, ctx)
    }
}
