#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Progress and log state of a pkgfront run
//!
//! - [`ProgressTracker`]: the bounded percentage shown in the progress bar,
//!   plus the terminal state that picks the status icon.
//! - [`LogAccumulator`]: the ever-growing, per-run log text.
//!
//! Neither type ever fails: inputs are wrapped or appended, never rejected.

mod log;
mod tracker;

pub use log::LogAccumulator;
pub use pkgfront_types::StatusIcon;
pub use tracker::ProgressTracker;
