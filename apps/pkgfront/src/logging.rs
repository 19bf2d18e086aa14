//! Structured logging integration for events
//!
//! Every event the controller publishes is also written to the tracing
//! log with structured fields, at the level the event itself declares.

use pkgfront_events::{AppEvent, EventMessage, GeneralEvent, RunEvent};
use tracing::{debug, error, info, warn};

/// Log an `EventMessage` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let source = meta.source.as_str();
    let correlation = meta.correlation_id.as_deref().unwrap_or("-");

    match &message.event {
        AppEvent::Run(run_event) => match run_event {
            RunEvent::Started {
                run_id,
                kind,
                title,
                blocking,
            } => {
                info!(
                    source,
                    event_id = %meta.event_id,
                    run_id = %run_id,
                    kind = %kind,
                    blocking,
                    "{title}"
                );
            }
            RunEvent::ActionChanged { text } => {
                info!(source, correlation, action = %text, "action changed");
            }
            RunEvent::LogAppended { text, newline } => {
                debug!(source, correlation, newline, "{text}");
            }
            RunEvent::ProgressChanged { percentage } => {
                debug!(source, correlation, percentage, "progress changed");
            }
            RunEvent::IconChanged { icon } => {
                debug!(source, correlation, icon = ?icon, "icon changed");
            }
            RunEvent::LogExpanded => {
                debug!(source, correlation, "log expanded");
            }
            RunEvent::SeriousErrorDetected { reason } => {
                error!(source, correlation, reason = %reason, "serious error detected");
            }
            RunEvent::Finished { has_error } => {
                if *has_error {
                    error!(source, correlation, "run finished with errors");
                } else {
                    info!(source, correlation, "run finished");
                }
            }
            RunEvent::Dismissed { has_error } => {
                info!(source, correlation, has_error, "run dismissed");
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Warning { message, context } => {
                warn!(source, correlation, context = ?context, "{message}");
            }
            GeneralEvent::Error { message, details } => {
                error!(source, correlation, details = ?details, "{message}");
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(source, correlation, context = ?context, "{message}");
            }
            GeneralEvent::UserConfirmationRequired { prompt, default } => {
                info!(source, correlation, default, "confirmation requested: {prompt}");
            }
            GeneralEvent::UserConfirmationReceived { prompt, response } => {
                info!(source, correlation, response, "confirmation answered: {prompt}");
            }
        },
    }
}
