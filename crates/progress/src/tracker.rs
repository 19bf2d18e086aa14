//! Wrapping percentage counter

use pkgfront_types::StatusIcon;
use serde::{Deserialize, Serialize};

/// Percentage shown while a run is in flight.
///
/// The runner never announces how much work remains, so the bar is driven by
/// increments and wraps at 100 instead of saturating. Only [`finish`] shows a
/// full bar.
///
/// [`finish`]: ProgressTracker::finish
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTracker {
    percentage: u32,
    /// `Some(has_error)` once the run reached its terminal state
    terminal: Option<bool>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to an empty bar and no terminal state
    pub fn reset(&mut self) {
        self.percentage = 0;
        self.terminal = None;
    }

    /// Store `value mod 100` and return the stored value.
    ///
    /// An accumulated value of exactly 100 therefore reads as 0, the empty bar.
    pub fn set_percentage(&mut self, value: u32) -> u32 {
        self.percentage = value % 100;
        self.percentage
    }

    /// Advance by `delta`, wrapping like [`set_percentage`](Self::set_percentage)
    pub fn add_percentage(&mut self, delta: u32) -> u32 {
        self.set_percentage(self.percentage.saturating_add(delta))
    }

    /// Show a full bar and record the terminal state for icon selection
    pub fn finish(&mut self, has_error: bool) {
        self.percentage = 100;
        self.terminal = Some(has_error);
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    /// Fill fraction of the bar in `[0.0, 1.0]`
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.percentage == 0 {
            0.0
        } else {
            f64::from(self.percentage) / 100.0
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.terminal.is_some()
    }

    /// Error state recorded by [`finish`](Self::finish), if finished
    #[must_use]
    pub fn terminal_error(&self) -> Option<bool> {
        self.terminal
    }

    #[must_use]
    pub fn icon(&self) -> StatusIcon {
        match self.terminal {
            None => StatusIcon::Busy,
            Some(has_error) => StatusIcon::for_outcome(has_error),
        }
    }
}
