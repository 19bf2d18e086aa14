//! Orchestration of one run from start to dismissal

use crate::frontend::{DefaultAnswer, Frontend, Prompter};
use crate::handle::ControllerHandle;
use crate::runner::{CommandRunner, RunRequest};
use crate::state::{lock, RunOutcome, RunPhase, RunSnapshot, RunState};
use pkgfront_classifier::{ClassifyContext, EventClassifier, TextMatchClassifier};
use pkgfront_errors::{Error, OpsError, RunnerError};
use pkgfront_events::{AppEvent, EventEmitter, EventSender, GeneralEvent, RunnerEvent};
use pkgfront_types::{
    ChannelCommand, InstallOptions, OperationKind, OperationTarget, PackageSpec,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use uuid::Uuid;

/// Drives runs of a command runner and reflects them on a progress surface.
///
/// Runs follow `Idle -> Running -> Finished -> Idle`. The last step needs
/// the operator: blocking entry points only return once a
/// [`ControllerHandle`] delivered the dismissal.
pub struct OperationController<R> {
    runner: R,
    core: RunCore,
    gate: Option<oneshot::Receiver<RunOutcome>>,
}

/// Everything the runner reaches through the `Frontend` callbacks
struct RunCore {
    state: Arc<Mutex<RunState>>,
    tx: Option<EventSender>,
    classifier: Box<dyn EventClassifier>,
    prompter: Box<dyn Prompter>,
    run_id: Option<Uuid>,
}

impl<R: CommandRunner> OperationController<R> {
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            core: RunCore {
                state: Arc::new(Mutex::new(RunState::default())),
                tx: None,
                classifier: Box::new(TextMatchClassifier::new()),
                prompter: Box::new(DefaultAnswer),
                run_id: None,
            },
            gate: None,
        }
    }

    /// Publish run state changes on this channel
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.core.tx = Some(tx);
        self
    }

    /// Replace the default text-matching classifier
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl EventClassifier + 'static) -> Self {
        self.core.classifier = Box::new(classifier);
        self
    }

    /// Answer runner confirmations through `prompter`
    #[must_use]
    pub fn with_prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.core.prompter = Box::new(prompter);
        self
    }

    /// Handle for observing the run and delivering dismissals
    #[must_use]
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle::new(Arc::clone(&self.core.state), self.core.tx.clone())
    }

    /// Install or upgrade a package and wait for the operator to dismiss
    /// the result.
    ///
    /// Without a channel, `package` names a local package file.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion gate closes before dismissal.
    pub async fn install_package(
        &mut self,
        channel: Option<&str>,
        package: &str,
        version: Option<&str>,
        options: InstallOptions,
    ) -> Result<RunOutcome, Error> {
        let target = match channel {
            Some(channel) => OperationTarget::Package(PackageSpec {
                channel: channel.to_string(),
                package: package.to_string(),
                version: version.map(str::to_string),
            }),
            None => OperationTarget::File(PathBuf::from(package)),
        };
        self.start(OperationKind::Install, target, options, true).await
    }

    /// Uninstall a package and wait for dismissal
    ///
    /// # Errors
    ///
    /// Returns an error if the completion gate closes before dismissal.
    pub async fn uninstall_package(
        &mut self,
        channel: &str,
        package: &str,
        options: InstallOptions,
    ) -> Result<RunOutcome, Error> {
        let target = OperationTarget::Package(PackageSpec {
            channel: channel.to_string(),
            package: package.to_string(),
            version: None,
        });
        self.start(OperationKind::Uninstall, target, options, true).await
    }

    /// Run a channel maintenance command and wait for dismissal
    ///
    /// # Errors
    ///
    /// Returns an error if the completion gate closes before dismissal.
    pub async fn channel_command(
        &mut self,
        command: ChannelCommand,
        target: &str,
    ) -> Result<RunOutcome, Error> {
        self.start(
            command.kind(),
            OperationTarget::Channel(target.to_string()),
            InstallOptions::default(),
            true,
        )
        .await
    }

    /// Begin a run, invoke the command runner, and, when `blocking`, wait
    /// until the operator dismissed the finished run.
    ///
    /// Runner failures never surface here: they end up in the run's log and
    /// error flag.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::GateClosed` if the completion gate is dropped
    /// without a dismissal, and `OpsError::InvalidOperation` for generic
    /// runs, which have nothing to invoke.
    pub async fn start(
        &mut self,
        kind: OperationKind,
        target: OperationTarget,
        options: InstallOptions,
        blocking: bool,
    ) -> Result<RunOutcome, Error> {
        if kind == OperationKind::Generic {
            return Err(OpsError::InvalidOperation {
                operation: "generic runs are started with show()".to_string(),
            }
            .into());
        }

        let title = title_for(kind, &target);
        self.begin(kind, Some(target.clone()), title, blocking);

        let request = RunRequest::new(kind, Some(target), options);
        self.core.emit_debug(format!(
            "invoking {} {}",
            request.command(),
            request.arguments().join(" ")
        ));
        let result = self.runner.invoke(&request, &mut self.core);
        match result {
            Ok(()) => self.core.complete(),
            Err(error) => self.core.fail(&error),
        }

        self.wait_dismissed().await
    }

    /// Show the progress surface for work driven by hand through
    /// [`dispatch`](Self::dispatch) and [`report_failure`](Self::report_failure).
    pub fn show(&mut self, action: &str, blocking: bool) -> Uuid {
        self.begin(
            OperationKind::Generic,
            Some(OperationTarget::Label(action.to_string())),
            action.to_string(),
            blocking,
        )
    }

    /// Feed one runner callback into the active run
    pub fn dispatch(&mut self, event: RunnerEvent) {
        self.core.dispatch(event);
    }

    /// Record a synchronous failure and finish the active run
    pub fn report_failure(&mut self, error: &RunnerError) {
        self.core.fail(error);
    }

    /// Finish the active run if nothing did so already
    pub fn complete(&mut self) {
        self.core.complete();
    }

    /// Wait for the operator to dismiss a blocking run.
    ///
    /// Non-blocking runs resolve immediately with the current outcome.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::GateClosed` if the gate is dropped without a
    /// dismissal, or if no run was ever started.
    pub async fn wait_dismissed(&mut self) -> Result<RunOutcome, Error> {
        if let Some(gate) = self.gate.take() {
            return gate.await.map_err(|_| OpsError::GateClosed.into());
        }
        lock(&self.core.state)
            .outcome()
            .ok_or_else(|| OpsError::GateClosed.into())
    }

    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        lock(&self.core.state).snapshot()
    }

    #[must_use]
    pub fn phase(&self) -> RunPhase {
        lock(&self.core.state).phase()
    }

    #[must_use]
    pub fn current_percentage(&self) -> u32 {
        lock(&self.core.state).percentage()
    }

    #[must_use]
    pub fn current_log_lines(&self) -> Vec<String> {
        lock(&self.core.state).log_lines()
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        lock(&self.core.state).has_serious_error()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        lock(&self.core.state).is_finished()
    }

    /// See [`ControllerHandle::user_requests_dismiss`]
    pub fn user_requests_dismiss(&self) -> bool {
        self.handle().user_requests_dismiss()
    }

    /// See [`ControllerHandle::user_requests_close`]
    pub fn user_requests_close(&self) -> bool {
        self.handle().user_requests_close()
    }

    fn begin(
        &mut self,
        kind: OperationKind,
        target: Option<OperationTarget>,
        title: String,
        blocking: bool,
    ) -> Uuid {
        let mut events = Vec::new();
        let (run_id, gate) = lock(&self.core.state).begin(kind, target, title, blocking, &mut events);
        self.core.run_id = Some(run_id);
        self.gate = gate;
        tracing::debug!(%run_id, %kind, blocking, "run started");
        self.core.publish(events);
        run_id
    }
}

impl RunCore {
    fn dispatch(&mut self, event: RunnerEvent) {
        let mut events = Vec::new();
        {
            let mut state = lock(&self.state);
            if state.phase() == RunPhase::Idle {
                tracing::debug!(kind = event.kind(), "event outside a run dropped");
                return;
            }
            let classification = {
                let ctx = ClassifyContext {
                    has_serious_error: state.has_serious_error(),
                    package: state.package(),
                };
                self.classifier.classify(&event, &ctx)
            };
            for effect in classification.effects {
                state.apply(effect, &mut events);
            }
        }
        self.publish(events);
    }

    /// The runner returned cleanly; a run it left open is over anyway
    fn complete(&mut self) {
        let mut events = Vec::new();
        {
            let mut state = lock(&self.state);
            if state.phase() == RunPhase::Running {
                tracing::debug!(run_id = ?self.run_id, "runner returned without a terminal event");
                state.finish(&mut events);
            }
        }
        self.publish(events);
    }

    fn fail(&mut self, error: &RunnerError) {
        tracing::error!(run_id = ?self.run_id, error = %error, "command runner failed");
        let mut events = Vec::new();
        {
            let mut state = lock(&self.state);
            if state.phase() == RunPhase::Idle {
                return;
            }
            state.fail(error, &mut events);
        }
        self.publish(events);
    }

    fn publish(&self, events: Vec<AppEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

impl Frontend for RunCore {
    fn handle_event(&mut self, event: RunnerEvent) {
        self.dispatch(event);
    }

    fn user_confirm(&mut self, prompt: &str, default: bool) -> bool {
        self.emit(GeneralEvent::UserConfirmationRequired {
            prompt: prompt.to_string(),
            default,
        });
        let response = self.prompter.confirm(prompt, default);
        tracing::debug!(%prompt, response, "confirmation answered");
        self.emit(GeneralEvent::UserConfirmationReceived {
            prompt: prompt.to_string(),
            response,
        });
        response
    }
}

impl EventEmitter for RunCore {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }

    fn correlation_id(&self) -> Option<String> {
        self.run_id.map(|id| id.to_string())
    }
}

/// Title and initial action label of a run
fn title_for(kind: OperationKind, target: &OperationTarget) -> String {
    match kind {
        OperationKind::Install => format!("Installing {target}"),
        OperationKind::Uninstall => format!("Uninstalling {target}"),
        OperationKind::ChannelDiscover => format!("Discovering channel {target}"),
        OperationKind::ChannelDelete => format!("Deleting channel {target}"),
        OperationKind::ChannelUpdate => format!("Updating channel {target}"),
        OperationKind::Generic => target.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgfront_types::StatusIcon;
    use serde_json::json;

    fn noop(_: &RunRequest, _: &mut dyn Frontend) -> Result<(), RunnerError> {
        Ok(())
    }

    #[test]
    fn titles() {
        let target = OperationTarget::Package(PackageSpec::parse("foo/bar-1.0").unwrap());
        assert_eq!(title_for(OperationKind::Install, &target), "Installing foo/bar");
        assert_eq!(
            title_for(
                OperationKind::ChannelDelete,
                &OperationTarget::Channel("foo.example.com".into())
            ),
            "Deleting channel foo.example.com"
        );
    }

    #[test]
    fn show_runs_until_terminal_event() {
        let mut controller = OperationController::new(noop);
        controller.show("Refreshing", false);
        assert_eq!(controller.phase(), RunPhase::Running);
        assert_eq!(controller.snapshot().surface.action, "Refreshing");

        controller.dispatch(RunnerEvent::log("."));
        controller.dispatch(RunnerEvent::data("pear/Foo is up to date"));
        assert!(controller.is_finished());
        assert!(!controller.has_error());
        assert_eq!(controller.current_percentage(), 100);
        assert_eq!(controller.snapshot().surface.icon, StatusIcon::Success);
    }

    #[test]
    fn events_after_dismissal_are_dropped() {
        let mut controller = OperationController::new(noop);
        controller.show("Refreshing", false);
        controller.dispatch(RunnerEvent::data(json!("Error: boom")));
        assert!(controller.user_requests_dismiss());

        controller.dispatch(RunnerEvent::log("late"));
        assert_eq!(controller.current_log_lines(), vec!["Error: boom"]);
        assert_eq!(controller.phase(), RunPhase::Idle);
    }

    #[tokio::test]
    async fn generic_kind_is_rejected_by_start() {
        let mut controller = OperationController::new(noop);
        let result = controller
            .start(
                OperationKind::Generic,
                OperationTarget::Label("x".into()),
                InstallOptions::default(),
                false,
            )
            .await;
        assert!(result.is_err());
        assert_eq!(controller.phase(), RunPhase::Idle);
    }
}
