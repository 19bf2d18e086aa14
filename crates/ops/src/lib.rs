#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Operation orchestration for pkgfront
//!
//! The [`OperationController`] drives one run at a time: it resets the run
//! state, invokes a [`CommandRunner`], classifies every callback the runner
//! makes, and holds blocking callers until the operator dismisses the
//! finished run through a [`ControllerHandle`].

mod controller;
mod frontend;
mod handle;
pub mod runner;
mod state;

pub use controller::OperationController;
pub use frontend::{DefaultAnswer, Frontend, Prompter};
pub use handle::ControllerHandle;
pub use runner::{CommandRunner, ProcessRunner, RunRequest, ScriptControl, ScriptRunner, ScriptStep};
pub use state::{RunOutcome, RunPhase, RunSnapshot, Surface};
