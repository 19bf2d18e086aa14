//! Operation kinds and their options

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of work a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Install,
    Uninstall,
    ChannelDiscover,
    ChannelDelete,
    ChannelUpdate,
    /// Work started by hand through the generic entry point
    Generic,
}

impl OperationKind {
    /// Command name handed to the command runner.
    ///
    /// Installs always go through `upgrade` so an already installed package
    /// is replaced instead of rejected.
    #[must_use]
    pub fn runner_command(self) -> &'static str {
        match self {
            Self::Install => "upgrade",
            Self::Uninstall => "uninstall",
            Self::ChannelDiscover => "channel-discover",
            Self::ChannelDelete => "channel-delete",
            Self::ChannelUpdate => "channel-update",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::ChannelDiscover => "channel-discover",
            Self::ChannelDelete => "channel-delete",
            Self::ChannelUpdate => "channel-update",
            Self::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// Channel maintenance commands offered by the channel dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelCommand {
    Discover,
    Delete,
    Update,
}

impl ChannelCommand {
    #[must_use]
    pub fn kind(self) -> OperationKind {
        match self {
            Self::Discover => OperationKind::ChannelDiscover,
            Self::Delete => OperationKind::ChannelDelete,
            Self::Update => OperationKind::ChannelUpdate,
        }
    }
}

/// How dependencies are handled during an install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyMode {
    /// Install required dependencies only
    OnlyReqDeps,
    /// Install required and optional dependencies
    AllDeps,
    /// Ignore dependencies entirely
    NoDeps,
}

impl DependencyMode {
    /// Option name understood by the package manager
    #[must_use]
    pub fn option_name(self) -> &'static str {
        match self {
            Self::OnlyReqDeps => "onlyreqdeps",
            Self::AllDeps => "alldeps",
            Self::NoDeps => "nodeps",
        }
    }
}

impl clap::ValueEnum for DependencyMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::OnlyReqDeps, Self::AllDeps, Self::NoDeps]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.option_name()))
    }
}

/// Options passed through to the command runner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOptions {
    /// Dependency handling; only meaningful for installs
    pub dependencies: Option<DependencyMode>,
    /// Reinstall or remove even if the package manager objects
    pub force: bool,
}

impl InstallOptions {
    /// Option names to enable for the given operation.
    ///
    /// Dependency handling only applies to installs; `force` applies to all
    /// package operations.
    #[must_use]
    pub fn option_names(&self, kind: OperationKind) -> Vec<&'static str> {
        let mut names = Vec::new();
        if kind == OperationKind::Install {
            if let Some(mode) = self.dependencies {
                names.push(mode.option_name());
            }
        }
        if self.force && matches!(kind, OperationKind::Install | OperationKind::Uninstall) {
            names.push("force");
        }
        names
    }
}
