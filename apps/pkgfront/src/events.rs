//! Event handling and progress display
//!
//! The terminal stands in for the progress window: a bar with the run's
//! title and action label, and a log panel that stays collapsed until the
//! run asks for it to be expanded.

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use pkgfront_events::{AppEvent, EventMessage, GeneralEvent, RunEvent};
use pkgfront_progress::{LogAccumulator, StatusIcon};

/// Renders controller events on the terminal
pub struct EventHandler {
    bar: ProgressBar,
    json_output: bool,
    /// Run whose events are being drawn
    run_id: Option<String>,
    /// Local copy of the run log, printed when the panel expands
    log: LogAccumulator,
    log_expanded: bool,
    /// Lines already printed from `log`
    printed: usize,
}

impl EventHandler {
    /// Create new event handler drawing on `bar`
    pub fn new(bar: ProgressBar, json_output: bool) -> Self {
        Self {
            bar,
            json_output,
            run_id: None,
            log: LogAccumulator::new(),
            log_expanded: false,
            printed: 0,
        }
    }

    /// Progress bar for the given output mode
    pub fn progress_bar(json_output: bool) -> ProgressBar {
        if json_output {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr());
        if let Ok(bar_style) =
            ProgressStyle::with_template("{prefix} [{bar:40.cyan/blue}] {pos:>3}% {wide_msg}")
        {
            bar.set_style(bar_style.progress_chars("#>-"));
        }
        bar
    }

    /// Handle one event; returns true when the run finished and waits for
    /// the operator to dismiss it
    pub fn handle_event(&mut self, message: EventMessage) -> bool {
        if self.json_output {
            if let Ok(line) = serde_json::to_string(&message) {
                println!("{line}");
            }
            return matches!(message.event, AppEvent::Run(RunEvent::Finished { .. }));
        }

        if let AppEvent::Run(RunEvent::Started { run_id, .. }) = &message.event {
            self.run_id = Some(run_id.to_string());
        } else if message.meta.correlation_id.is_some() && message.meta.correlation_id != self.run_id {
            // Straggler from a replaced run
            return false;
        }

        match message.event {
            AppEvent::Run(event) => self.handle_run_event(event),
            AppEvent::General(event) => {
                self.handle_general_event(event);
                false
            }
        }
    }

    fn handle_run_event(&mut self, event: RunEvent) -> bool {
        match event {
            RunEvent::Started { title, .. } => {
                self.log.clear();
                self.printed = 0;
                self.bar.reset();
                self.bar.set_prefix(icon_text(StatusIcon::Busy));
                self.bar.set_message(title);
            }
            RunEvent::ActionChanged { text } => self.bar.set_message(text),
            RunEvent::ProgressChanged { percentage } => {
                self.bar.set_position(u64::from(percentage));
            }
            RunEvent::IconChanged { icon } => self.bar.set_prefix(icon_text(icon)),
            RunEvent::LogAppended { text, newline } => {
                self.log.append(&text, newline);
                if self.log_expanded {
                    self.flush_log(false);
                }
            }
            RunEvent::LogExpanded => {
                self.log_expanded = true;
                self.flush_log(false);
            }
            RunEvent::SeriousErrorDetected { reason } => {
                tracing::debug!(%reason, "serious error shown");
            }
            RunEvent::Finished { has_error } => {
                if self.log_expanded {
                    self.flush_log(true);
                }
                let result = if has_error {
                    style("failed").red().bold().to_string()
                } else {
                    style("done").green().bold().to_string()
                };
                self.bar.abandon_with_message(format!("{} ({result})", self.bar.message()));
                return true;
            }
            RunEvent::Dismissed { .. } => {}
        }
        false
    }

    fn handle_general_event(&mut self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => {
                let text = match context {
                    Some(context) => format!("warning: {message} ({context})"),
                    None => format!("warning: {message}"),
                };
                self.show_line(&style(text).yellow().to_string());
            }
            GeneralEvent::Error { message, details } => {
                let text = match details {
                    Some(details) => format!("error: {message}: {details}"),
                    None => format!("error: {message}"),
                };
                self.show_line(&style(text).red().to_string());
            }
            GeneralEvent::DebugLog { .. }
            | GeneralEvent::UserConfirmationRequired { .. }
            | GeneralEvent::UserConfirmationReceived { .. } => {}
        }
    }

    /// Print log lines not shown yet; an open last line is held back
    /// unless `include_open` is set
    fn flush_log(&mut self, include_open: bool) {
        let lines = self.log.lines();
        let complete = if include_open || !self.log.is_line_open() {
            lines.len()
        } else {
            lines.len().saturating_sub(1)
        };
        let pending: Vec<String> = lines[self.printed.min(complete)..complete].to_vec();
        self.printed = self.printed.max(complete);
        for line in pending {
            self.show_line(&format!("  {}", style(line).dim()));
        }
    }

    /// Print a line above the bar
    fn show_line(&self, line: &str) {
        if self.bar.is_hidden() {
            eprintln!("{line}");
        } else {
            self.bar.println(line);
        }
    }

    /// Whether the run log is being shown
    pub fn log_expanded(&self) -> bool {
        self.log_expanded
    }
}

fn icon_text(icon: StatusIcon) -> String {
    match icon {
        StatusIcon::Busy => style("…").cyan().to_string(),
        StatusIcon::Success => style("✔").green().to_string(),
        StatusIcon::Error => style("✘").red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgfront_types::OperationKind;
    use uuid::Uuid;

    fn started(handler: &mut EventHandler) -> String {
        let run_id = Uuid::new_v4();
        handler.handle_event(EventMessage::for_run(
            RunEvent::Started {
                run_id,
                kind: OperationKind::Install,
                title: "Installing foo/bar".into(),
                blocking: true,
            }
            .into(),
            run_id.to_string(),
        ));
        run_id.to_string()
    }

    #[test]
    fn test_stragglers_from_other_runs_are_ignored() {
        let mut handler = EventHandler::new(ProgressBar::hidden(), false);
        started(&mut handler);
        let finished = handler.handle_event(EventMessage::for_run(
            RunEvent::Finished { has_error: false }.into(),
            Uuid::new_v4().to_string(),
        ));
        assert!(!finished);
    }

    #[test]
    fn test_log_stays_collapsed_until_expanded() {
        let mut handler = EventHandler::new(ProgressBar::hidden(), false);
        let run = started(&mut handler);
        handler.handle_event(EventMessage::for_run(
            RunEvent::LogAppended {
                text: ".".into(),
                newline: true,
            }
            .into(),
            run.clone(),
        ));
        assert_eq!(handler.printed, 0);

        handler.handle_event(EventMessage::for_run(RunEvent::LogExpanded.into(), run.clone()));
        assert!(handler.log_expanded());
        assert_eq!(handler.printed, 1);

        let finished = handler.handle_event(EventMessage::for_run(
            RunEvent::Finished { has_error: true }.into(),
            run,
        ));
        assert!(finished);
    }
}
