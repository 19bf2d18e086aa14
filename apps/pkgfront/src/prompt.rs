//! Operator interaction: confirmations and dismissal

use crate::error::CliError;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Confirm};
use indicatif::ProgressBar;
use pkgfront_ops::{ControllerHandle, Prompter};

/// Answers runner confirmations on the terminal
pub struct CliPrompter {
    bar: ProgressBar,
    /// Fixed answer when nobody can or should be asked
    answer: Option<bool>,
}

impl CliPrompter {
    pub fn new(bar: ProgressBar, answer: Option<bool>) -> Self {
        Self { bar, answer }
    }
}

impl Prompter for CliPrompter {
    fn confirm(&mut self, prompt: &str, default: bool) -> bool {
        if let Some(answer) = self.answer {
            return answer;
        }
        self.bar
            .suspend(|| {
                Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(prompt)
                    .default(default)
                    .interact()
            })
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "confirmation failed, using default");
                default
            })
    }
}

/// Dismiss the finished run, after the operator pressed Enter when `interactive`
pub async fn dismiss_finished_run(
    handle: &ControllerHandle,
    interactive: bool,
) -> Result<(), CliError> {
    if interactive {
        Term::stderr().write_line("Press Enter to close")?;
        tokio::task::spawn_blocking(|| Term::stderr().read_line())
            .await
            .map_err(std::io::Error::other)??;
    }
    if !handle.user_requests_dismiss() {
        tracing::warn!(phase = ?handle.phase(), "dismissal was not honoured");
    }
    Ok(())
}
