#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for pkgfront
//!
//! Two directions of traffic live here:
//!
//! - **Inbound**: [`RunnerEvent`], the callbacks a command runner makes
//!   while it performs an operation.
//! - **Outbound**: [`AppEvent`], the state changes the controller publishes
//!   to whatever draws the progress surface. Each one travels inside an
//!   [`EventMessage`] carrying [`EventMeta`].

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod runner;
pub use runner::RunnerEvent;

pub mod events;
pub use events::{AppEvent, GeneralEvent, RunEvent};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// An event plus the metadata attached at emission time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    /// Wrap an event, deriving level and source from the event itself
    #[must_use]
    pub fn new(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        Self { meta, event }
    }

    /// Wrap an event belonging to a run
    #[must_use]
    pub fn for_run(event: AppEvent, run_id: impl Into<String>) -> Self {
        let mut message = Self::new(event);
        message.meta = message.meta.with_correlation_id(run_id);
        message
    }
}

/// Type alias for the outbound event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for the outbound event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implemented by the raw `EventSender` and by anything that owns one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Correlation identifier stamped on emitted events
    fn correlation_id(&self) -> Option<String> {
        None
    }

    /// Emit an event through this emitter
    fn emit(&self, event: impl Into<AppEvent>) {
        if let Some(sender) = self.event_sender() {
            let event = event.into();
            let message = match self.correlation_id() {
                Some(id) => EventMessage::for_run(event, id),
                None => EventMessage::new(event),
            };
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(message);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(GeneralEvent::debug(message));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(GeneralEvent::warning(message));
    }

}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
