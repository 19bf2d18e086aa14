//! Presentation-side access to the active run

use crate::state::{lock, DismissRequest, RunOutcome, RunPhase, RunSnapshot, RunState};
use pkgfront_events::{EventEmitter, EventSender};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Clonable view of a controller's run.
///
/// The presentation layer keeps one of these to render the run and to
/// deliver the operator's dismissal while the controller itself is busy
/// inside [`start`](crate::OperationController::start).
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    state: Arc<Mutex<RunState>>,
    tx: Option<EventSender>,
}

impl ControllerHandle {
    pub(crate) fn new(state: Arc<Mutex<RunState>>, tx: Option<EventSender>) -> Self {
        Self { state, tx }
    }

    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        lock(&self.state).snapshot()
    }

    #[must_use]
    pub fn phase(&self) -> RunPhase {
        lock(&self.state).phase()
    }

    #[must_use]
    pub fn current_percentage(&self) -> u32 {
        lock(&self.state).percentage()
    }

    #[must_use]
    pub fn current_log_lines(&self) -> Vec<String> {
        lock(&self.state).log_lines()
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        lock(&self.state).has_serious_error()
    }

    /// Whether the current run reached its terminal state; stays true
    /// after dismissal until the next run starts
    #[must_use]
    pub fn is_finished(&self) -> bool {
        lock(&self.state).is_finished()
    }

    /// Outcome of the current run, if one was started
    #[must_use]
    pub fn outcome(&self) -> Option<RunOutcome> {
        lock(&self.state).outcome()
    }

    /// Operator clicked the close affordance.
    ///
    /// Returns whether the request was honoured.
    pub fn user_requests_dismiss(&self) -> bool {
        self.request(DismissRequest::Dismiss)
    }

    /// Operator tried to close the window; ignored until the run is over.
    ///
    /// Returns whether the request was honoured.
    pub fn user_requests_close(&self) -> bool {
        self.request(DismissRequest::Close)
    }

    /// Watch phase transitions
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RunPhase> {
        lock(&self.state).subscribe()
    }

    /// Resolve once the controller enters `phase`
    pub async fn wait_for_phase(&self, phase: RunPhase) {
        let mut phases = self.subscribe();
        // The sender lives inside the shared state, which outlives `self`
        let _ = phases.wait_for(|current| *current == phase).await;
    }

    fn request(&self, request: DismissRequest) -> bool {
        let mut events = Vec::new();
        let honoured = lock(&self.state).dismiss(request, &mut events);
        for event in events {
            self.emit(event);
        }
        honoured
    }
}

impl EventEmitter for ControllerHandle {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }

    fn correlation_id(&self) -> Option<String> {
        lock(&self.state).run_id.map(|id| id.to_string())
    }
}
