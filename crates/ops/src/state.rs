//! Mutable state of the active run

use pkgfront_classifier::Effect;
use pkgfront_errors::RunnerError;
use pkgfront_events::{AppEvent, GeneralEvent, RunEvent};
use pkgfront_progress::{LogAccumulator, ProgressTracker};
use pkgfront_types::{OperationKind, OperationTarget, StatusIcon};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{oneshot, watch};
use uuid::Uuid;

/// Where the controller's state machine stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Nothing shown
    #[default]
    Idle,
    /// The command runner is working
    Running,
    /// Terminal state reached, waiting for the operator
    Finished,
}

/// What the progress surface displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    pub title: String,
    pub action: String,
    pub icon: StatusIcon,
    pub log_expanded: bool,
    pub visible: bool,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            title: String::new(),
            action: String::new(),
            icon: StatusIcon::Busy,
            log_expanded: false,
            visible: false,
        }
    }
}

/// Point-in-time copy of the run for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub run_id: Option<Uuid>,
    pub kind: Option<OperationKind>,
    pub target: Option<OperationTarget>,
    pub phase: RunPhase,
    pub blocking: bool,
    pub percentage: u32,
    pub has_error: bool,
    pub is_finished: bool,
    pub log: Vec<String>,
    pub surface: Surface,
}

/// What a caller gets back once a run is over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub kind: OperationKind,
    pub has_error: bool,
    pub log: Vec<String>,
}

/// Which affordance the operator used to leave the finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DismissRequest {
    /// Explicit close button
    Dismiss,
    /// Window close attempt
    Close,
}

/// Run state shared between the controller and its handles
#[derive(Debug)]
pub(crate) struct RunState {
    pub(crate) run_id: Option<Uuid>,
    pub(crate) kind: Option<OperationKind>,
    pub(crate) target: Option<OperationTarget>,
    pub(crate) blocking: bool,
    phase: RunPhase,
    phase_tx: watch::Sender<RunPhase>,
    has_serious_error: bool,
    tracker: ProgressTracker,
    log: LogAccumulator,
    surface: Surface,
    gate: Option<oneshot::Sender<RunOutcome>>,
}

impl Default for RunState {
    fn default() -> Self {
        let (phase_tx, _) = watch::channel(RunPhase::Idle);
        Self {
            run_id: None,
            kind: None,
            target: None,
            blocking: false,
            phase: RunPhase::Idle,
            phase_tx,
            has_serious_error: false,
            tracker: ProgressTracker::new(),
            log: LogAccumulator::new(),
            surface: Surface::default(),
            gate: None,
        }
    }
}

/// Lock the shared state, recovering from a poisoned mutex
pub(crate) fn lock(state: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RunState {
    pub(crate) fn phase(&self) -> RunPhase {
        self.phase
    }

    pub(crate) fn has_serious_error(&self) -> bool {
        self.has_serious_error
    }

    pub(crate) fn percentage(&self) -> u32 {
        self.tracker.percentage()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.tracker.is_finished()
    }

    pub(crate) fn log_lines(&self) -> Vec<String> {
        self.log.lines().to_vec()
    }

    pub(crate) fn package(&self) -> Option<&str> {
        self.target.as_ref().and_then(OperationTarget::package)
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<RunPhase> {
        self.phase_tx.subscribe()
    }

    fn set_phase(&mut self, phase: RunPhase) {
        self.phase = phase;
        self.phase_tx.send_replace(phase);
    }

    /// Replace whatever was shown with a fresh run.
    ///
    /// The log panel keeps its expanded state across runs.
    pub(crate) fn begin(
        &mut self,
        kind: OperationKind,
        target: Option<OperationTarget>,
        title: String,
        blocking: bool,
        events: &mut Vec<AppEvent>,
    ) -> (Uuid, Option<oneshot::Receiver<RunOutcome>>) {
        let run_id = Uuid::new_v4();
        self.run_id = Some(run_id);
        self.kind = Some(kind);
        self.target = target;
        self.blocking = blocking;
        self.has_serious_error = false;
        self.tracker.reset();
        self.log.clear();
        self.surface = Surface {
            title: title.clone(),
            action: title.clone(),
            icon: StatusIcon::Busy,
            log_expanded: self.surface.log_expanded,
            visible: true,
        };

        let receiver = if blocking {
            let (tx, rx) = oneshot::channel();
            self.gate = Some(tx);
            Some(rx)
        } else {
            self.gate = None;
            None
        };
        self.set_phase(RunPhase::Running);

        events.push(
            RunEvent::Started {
                run_id,
                kind,
                title: title.clone(),
                blocking,
            }
            .into(),
        );
        events.push(RunEvent::IconChanged {
            icon: StatusIcon::Busy,
        }
        .into());
        events.push(RunEvent::ActionChanged { text: title }.into());
        events.push(RunEvent::ProgressChanged { percentage: 0 }.into());
        (run_id, receiver)
    }

    /// Apply one classified effect
    pub(crate) fn apply(&mut self, effect: Effect, events: &mut Vec<AppEvent>) {
        match effect {
            Effect::AppendLog { text, newline } => {
                self.log.append(&text, newline);
                events.push(RunEvent::LogAppended { text, newline }.into());
            }
            Effect::SetAction { text } => self.set_action(text, events),
            Effect::AddPercentage { delta } => {
                // The bar stays full once the run is over
                if self.phase == RunPhase::Running {
                    let percentage = self.tracker.add_percentage(delta);
                    events.push(RunEvent::ProgressChanged { percentage }.into());
                }
            }
            Effect::MarkSeriousError { reason } => self.mark_serious_error(reason, events),
            Effect::ExpandLog => self.expand_log(events),
            Effect::Finish => self.finish(events),
            Effect::Diagnostic { message } => {
                tracing::warn!(run_id = ?self.run_id, "{message}");
                events.push(GeneralEvent::warning(message).into());
            }
        }
    }

    fn set_action(&mut self, text: String, events: &mut Vec<AppEvent>) {
        self.surface.action.clone_from(&text);
        events.push(RunEvent::ActionChanged { text }.into());
    }

    fn expand_log(&mut self, events: &mut Vec<AppEvent>) {
        if !self.surface.log_expanded {
            self.surface.log_expanded = true;
            events.push(RunEvent::LogExpanded.into());
        }
    }

    fn mark_serious_error(&mut self, reason: String, events: &mut Vec<AppEvent>) {
        if self.has_serious_error {
            return;
        }
        self.has_serious_error = true;
        tracing::debug!(run_id = ?self.run_id, %reason, "serious error detected");
        events.push(RunEvent::SeriousErrorDetected { reason }.into());

        // An error arriving after the terminal state still decides the icon
        if self.phase == RunPhase::Finished {
            self.tracker.finish(true);
            self.show_terminal_state(events);
        }
    }

    /// Running to Finished, at most once per run
    pub(crate) fn finish(&mut self, events: &mut Vec<AppEvent>) {
        if self.phase != RunPhase::Running {
            return;
        }
        self.set_phase(RunPhase::Finished);
        self.tracker.finish(self.has_serious_error);
        tracing::debug!(
            run_id = ?self.run_id,
            has_error = self.has_serious_error,
            "run finished"
        );
        events.push(
            RunEvent::ProgressChanged {
                percentage: self.tracker.percentage(),
            }
            .into(),
        );
        self.show_terminal_state(events);
        events.push(RunEvent::Finished {
            has_error: self.has_serious_error,
        }
        .into());
    }

    fn show_terminal_state(&mut self, events: &mut Vec<AppEvent>) {
        let icon = self.tracker.icon();
        if self.surface.icon != icon {
            self.surface.icon = icon;
            events.push(RunEvent::IconChanged { icon }.into());
        }
        if self.has_serious_error {
            self.expand_log(events);
        }
    }

    /// Record a synchronous runner failure and end the run
    pub(crate) fn fail(&mut self, error: &RunnerError, events: &mut Vec<AppEvent>) {
        let message = error.message();
        self.mark_serious_error(message.clone(), events);
        self.set_action(message.clone(), events);
        self.apply(
            Effect::AppendLog {
                text: message.clone(),
                newline: true,
            },
            events,
        );
        if let Some(info) = error.user_info() {
            for line in info.lines() {
                self.apply(
                    Effect::AppendLog {
                        text: line.to_string(),
                        newline: true,
                    },
                    events,
                );
            }
        }
        events.push(match error.user_info() {
            Some(info) => GeneralEvent::error_with_details(message, info).into(),
            None => GeneralEvent::error(message).into(),
        });
        self.finish(events);
    }

    /// Leave the finished run if the request is honoured in the current phase.
    ///
    /// Dismiss works once the run is over, and also mid-run for runs nobody
    /// is blocked on. Close only works once the run is over.
    pub(crate) fn dismiss(&mut self, request: DismissRequest, events: &mut Vec<AppEvent>) -> bool {
        let honoured = match (self.phase, request) {
            (RunPhase::Finished, _) => true,
            (RunPhase::Running, DismissRequest::Dismiss) => !self.blocking,
            _ => false,
        };
        if !honoured {
            tracing::debug!(phase = ?self.phase, ?request, "dismissal ignored");
            return false;
        }

        self.set_phase(RunPhase::Idle);
        self.surface.visible = false;
        if let (Some(gate), Some(outcome)) = (self.gate.take(), self.outcome()) {
            // The caller may have stopped waiting
            let _ = gate.send(outcome);
        }
        events.push(RunEvent::Dismissed {
            has_error: self.has_serious_error,
        }
        .into());
        true
    }

    pub(crate) fn outcome(&self) -> Option<RunOutcome> {
        Some(RunOutcome {
            run_id: self.run_id?,
            kind: self.kind?,
            has_error: self.has_serious_error,
            log: self.log_lines(),
        })
    }

    pub(crate) fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            run_id: self.run_id,
            kind: self.kind,
            target: self.target.clone(),
            phase: self.phase,
            blocking: self.blocking,
            percentage: self.tracker.percentage(),
            has_error: self.has_serious_error,
            is_finished: self.tracker.is_finished(),
            log: self.log_lines(),
            surface: self.surface.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(blocking: bool) -> (RunState, Option<oneshot::Receiver<RunOutcome>>) {
        let mut state = RunState::default();
        let mut events = Vec::new();
        let (_, rx) = state.begin(
            OperationKind::Generic,
            None,
            "Working".into(),
            blocking,
            &mut events,
        );
        (state, rx)
    }

    #[test]
    fn begin_resets_previous_run() {
        let (mut state, _) = running(false);
        let mut events = Vec::new();
        state.apply(Effect::AddPercentage { delta: 57 }, &mut events);
        state.apply(
            Effect::MarkSeriousError {
                reason: "boom".into(),
            },
            &mut events,
        );
        state.apply(
            Effect::AppendLog {
                text: "line".into(),
                newline: true,
            },
            &mut events,
        );

        state.begin(OperationKind::Generic, None, "Again".into(), false, &mut events);
        assert_eq!(state.percentage(), 0);
        assert!(!state.has_serious_error());
        assert!(state.log_lines().is_empty());
        assert_eq!(state.phase(), RunPhase::Running);
    }

    #[test]
    fn finish_forces_full_bar_once() {
        let (mut state, _) = running(false);
        let mut events = Vec::new();
        state.apply(Effect::AddPercentage { delta: 57 }, &mut events);
        state.finish(&mut events);
        assert_eq!(state.percentage(), 100);

        let mut later = Vec::new();
        state.finish(&mut later);
        state.apply(Effect::AddPercentage { delta: 1 }, &mut later);
        assert!(later.is_empty());
        assert_eq!(state.percentage(), 100);
    }

    #[test]
    fn error_finish_expands_log_and_sets_icon() {
        let (mut state, _) = running(false);
        let mut events = Vec::new();
        state.apply(
            Effect::MarkSeriousError {
                reason: "error: x".into(),
            },
            &mut events,
        );
        state.finish(&mut events);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.surface.icon, StatusIcon::Error);
        assert!(snapshot.surface.log_expanded);
        assert!(events.contains(&RunEvent::Finished { has_error: true }.into()));
    }

    #[test]
    fn close_is_ignored_while_running() {
        let (mut state, _) = running(true);
        let mut events = Vec::new();
        assert!(!state.dismiss(DismissRequest::Close, &mut events));
        assert!(!state.dismiss(DismissRequest::Dismiss, &mut events));
        assert_eq!(state.phase(), RunPhase::Running);
        assert!(events.is_empty());
    }

    #[test]
    fn dismiss_mid_run_only_for_non_blocking_runs() {
        let (mut state, _) = running(false);
        let mut events = Vec::new();
        assert!(!state.dismiss(DismissRequest::Close, &mut events));
        assert!(state.dismiss(DismissRequest::Dismiss, &mut events));
        assert_eq!(state.phase(), RunPhase::Idle);
        assert!(!state.snapshot().surface.visible);
    }

    #[test]
    fn dismiss_releases_gate() {
        let (mut state, rx) = running(true);
        let mut events = Vec::new();
        state.finish(&mut events);
        assert!(state.dismiss(DismissRequest::Close, &mut events));

        let outcome = rx.unwrap().try_recv().unwrap();
        assert_eq!(outcome.kind, OperationKind::Generic);
        assert!(!outcome.has_error);
        assert!(!state.dismiss(DismissRequest::Dismiss, &mut events));
    }

    #[test]
    fn failure_logs_message_and_details() {
        let (mut state, _) = running(false);
        let mut events = Vec::new();
        state.fail(
            &RunnerError::failed("Channel not found", Some("unknown channel \"foo\"".into())),
            &mut events,
        );
        assert!(state.has_serious_error());
        assert!(state.is_finished());
        assert_eq!(
            state.log_lines(),
            vec!["Channel not found", "unknown channel \"foo\""]
        );
        assert_eq!(state.snapshot().surface.action, "Channel not found");
    }

    #[test]
    fn late_error_turns_icon_red() {
        let (mut state, _) = running(false);
        let mut events = Vec::new();
        state.finish(&mut events);
        assert_eq!(state.snapshot().surface.icon, StatusIcon::Success);

        state.fail(&RunnerError::failed("late", None), &mut events);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.surface.icon, StatusIcon::Error);
        assert!(snapshot.surface.log_expanded);
        assert_eq!(snapshot.phase, RunPhase::Finished);
    }
}
