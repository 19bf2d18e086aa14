//! Command runners: the collaborators that actually perform operations

mod process;
mod script;

pub use process::ProcessRunner;
pub use script::{ScriptControl, ScriptRunner, ScriptStep};

use crate::frontend::Frontend;
use pkgfront_errors::RunnerError;
use pkgfront_types::{InstallOptions, OperationKind, OperationTarget};
use serde::{Deserialize, Serialize};

/// One operation handed to a command runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub kind: OperationKind,
    pub target: Option<OperationTarget>,
    #[serde(default)]
    pub options: InstallOptions,
}

impl RunRequest {
    #[must_use]
    pub fn new(kind: OperationKind, target: Option<OperationTarget>, options: InstallOptions) -> Self {
        Self {
            kind,
            target,
            options,
        }
    }

    /// Command name the package manager knows this operation by
    #[must_use]
    pub fn command(&self) -> &'static str {
        self.kind.runner_command()
    }

    /// Arguments after the command name: option flags, then the target
    #[must_use]
    pub fn arguments(&self) -> Vec<String> {
        let mut args: Vec<String> = self
            .options
            .option_names(self.kind)
            .into_iter()
            .map(|name| format!("--{name}"))
            .collect();
        if let Some(target) = &self.target {
            args.push(target.runner_argument());
        }
        args
    }
}

/// Performs package operations and reports back through a [`Frontend`].
///
/// `invoke` runs to completion on the caller's thread, calling back into
/// `frontend` as it goes. Returning `Err` is the synchronous failure path:
/// the operation could not be carried out at all.
pub trait CommandRunner: Send {
    /// Perform one operation
    ///
    /// # Errors
    ///
    /// Returns a `RunnerError` if the operation could not be performed.
    fn invoke(&mut self, request: &RunRequest, frontend: &mut dyn Frontend) -> Result<(), RunnerError>;
}

impl<F> CommandRunner for F
where
    F: FnMut(&RunRequest, &mut dyn Frontend) -> Result<(), RunnerError> + Send,
{
    fn invoke(&mut self, request: &RunRequest, frontend: &mut dyn Frontend) -> Result<(), RunnerError> {
        self(request, frontend)
    }
}
