use pkgfront_types::{OperationKind, StatusIcon};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State changes of the active run, in the order the controller applied them.
///
/// A renderer that replays these events in order reconstructs exactly what
/// the controller's observers report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    /// A fresh run replaced whatever was shown before
    Started {
        run_id: Uuid,
        kind: OperationKind,
        title: String,
        blocking: bool,
    },

    /// The one-line action label changed
    ActionChanged { text: String },

    /// Text was appended to the log; `newline` closes the current line
    LogAppended { text: String, newline: bool },

    /// The bar moved
    ProgressChanged { percentage: u32 },

    /// The status icon changed
    IconChanged { icon: StatusIcon },

    /// The log panel must be expanded
    LogExpanded,

    /// The run saw an unrecoverable error
    SeriousErrorDetected { reason: String },

    /// The run reached its terminal state and awaits dismissal
    Finished { has_error: bool },

    /// The operator dismissed the finished run
    Dismissed { has_error: bool },
}
