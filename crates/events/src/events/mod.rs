use serde::{Deserialize, Serialize};

use crate::EventSource;

// Declare all domain modules
pub mod general;
pub mod run;

// Re-export all domain events
pub use general::*;
pub use run::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, confirmations)
    General(GeneralEvent),

    /// State changes of the active run
    Run(RunEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Run(_) => EventSource::RUN,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Run(RunEvent::SeriousErrorDetected { .. })
            | Self::Run(RunEvent::Finished { has_error: true }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Run(
                RunEvent::LogAppended { .. }
                | RunEvent::ProgressChanged { .. }
                | RunEvent::IconChanged { .. }
                | RunEvent::LogExpanded,
            ) => Level::DEBUG,

            _ => Level::INFO,
        }
    }
}

impl From<GeneralEvent> for AppEvent {
    fn from(event: GeneralEvent) -> Self {
        Self::General(event)
    }
}

impl From<RunEvent> for AppEvent {
    fn from(event: RunEvent) -> Self {
        Self::Run(event)
    }
}
