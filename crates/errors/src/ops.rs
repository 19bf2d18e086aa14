//! Operation orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpsError {
    #[error("invalid package specification: {spec}")]
    InvalidPackageSpec { spec: String },

    #[error("invalid operation: {operation}")]
    InvalidOperation { operation: String },

    #[error("completion gate closed before the run was dismissed")]
    GateClosed,
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidPackageSpec { .. } => {
                Some("Use channel/package-version, channel/package, or a path to a package file.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InvalidPackageSpec { .. } => "ops.invalid_package_spec",
            Self::InvalidOperation { .. } => "ops.invalid_operation",
            Self::GateClosed => "ops.gate_closed",
        })
    }
}
