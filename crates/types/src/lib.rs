#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for pkgfront
//!
//! This crate provides the vocabulary shared by the controller, the
//! command runners and the CLI: what kind of operation a run performs and
//! which channel/package it targets.

pub mod operation;
pub mod target;

pub use operation::{ChannelCommand, DependencyMode, InstallOptions, OperationKind};
pub use target::{OperationTarget, PackageSpec};

use serde::{Deserialize, Serialize};

/// Color output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}

/// Icon shown next to the run's action label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    /// Work in progress
    Busy,
    /// Finished without a serious error
    Success,
    /// Finished with a serious error
    Error,
}

impl StatusIcon {
    /// Terminal icon for a finished run
    #[must_use]
    pub fn for_outcome(has_error: bool) -> Self {
        if has_error {
            Self::Error
        } else {
            Self::Success
        }
    }
}
