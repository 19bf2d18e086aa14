//! What a run operates on

use pkgfront_errors::OpsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A package living on a channel, optionally pinned to a version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageSpec {
    pub channel: String,
    pub package: String,
    pub version: Option<String>,
}

impl PackageSpec {
    /// Parse `channel/package` or `channel/package-version`.
    ///
    /// The version is split off at the last `-` that is followed by a digit,
    /// so package names containing dashes stay intact.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::InvalidPackageSpec` if the channel or package part
    /// is missing.
    pub fn parse(s: &str) -> Result<Self, OpsError> {
        let invalid = || OpsError::InvalidPackageSpec {
            spec: s.to_string(),
        };
        let trimmed = s.trim().trim_start_matches("channel://");
        let (channel, rest) = trimmed.split_once('/').ok_or_else(invalid)?;
        if channel.is_empty() || rest.is_empty() || rest.contains('/') {
            return Err(invalid());
        }

        let split = rest
            .rmatch_indices('-')
            .map(|(pos, _)| pos)
            .find(|&pos| rest[pos + 1..].starts_with(|c: char| c.is_ascii_digit()));

        let (package, version) = match split {
            Some(pos) if pos > 0 => (&rest[..pos], Some(rest[pos + 1..].to_string())),
            _ => (rest, None),
        };

        Ok(Self {
            channel: channel.to_string(),
            package: package.to_string(),
            version,
        })
    }

    /// `channel://` URI understood by the package manager
    #[must_use]
    pub fn channel_uri(&self) -> String {
        match &self.version {
            Some(version) => format!("channel://{}/{}-{version}", self.channel, self.package),
            None => format!("channel://{}/{}", self.channel, self.package),
        }
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel, self.package)
    }
}

/// Subject of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OperationTarget {
    /// A package on a channel
    Package(PackageSpec),
    /// A local package file
    File(PathBuf),
    /// A channel name, or a URL when discovering
    Channel(String),
    /// Free-form description for generic runs
    Label(String),
}

impl OperationTarget {
    /// Interpret a command line argument as a package or a local file.
    ///
    /// Anything that looks like a path (absolute, relative, or an archive
    /// file name) is treated as a file install.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::InvalidPackageSpec` if the argument is neither a
    /// path nor a valid package specification.
    pub fn parse_package_or_file(s: &str) -> Result<Self, OpsError> {
        let looks_like_path = s.starts_with('/')
            || s.starts_with("./")
            || s.starts_with("../")
            || Path::new(s)
                .extension()
                .is_some_and(|ext| ext == "tgz" || ext == "tar" || ext == "gz");
        if looks_like_path {
            return Ok(Self::File(PathBuf::from(s)));
        }
        PackageSpec::parse(s).map(Self::Package)
    }

    /// Package name when the run targets a package or a package file
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        match self {
            Self::Package(spec) => Some(&spec.package),
            Self::File(path) => path.file_name().and_then(|name| name.to_str()),
            Self::Channel(_) | Self::Label(_) => None,
        }
    }

    /// Argument handed to the command runner
    #[must_use]
    pub fn runner_argument(&self) -> String {
        match self {
            Self::Package(spec) => spec.channel_uri(),
            Self::File(path) => path.display().to_string(),
            Self::Channel(channel) | Self::Label(channel) => channel.clone(),
        }
    }
}

impl fmt::Display for OperationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package(spec) => write!(f, "{spec}"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Channel(channel) | Self::Label(channel) => f.write_str(channel),
        }
    }
}
