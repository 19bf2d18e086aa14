//! Command line interface definition

use clap::{Parser, Subcommand};
use pkgfront_types::{ChannelCommand, ColorChoice, DependencyMode};
use std::path::PathBuf;

/// pkgfront - progress and log front-end for package manager operations
#[derive(Parser)]
#[command(name = "pkgfront")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Progress and log front-end for package manager operations")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Print every event as a JSON line instead of drawing progress
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer confirmations with yes and close finished runs without asking
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Replay a recorded JSON-lines script instead of running the package manager
    #[arg(long, global = true, value_name = "SCRIPT")]
    pub replay: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Install or upgrade a package from a channel or a local file
    #[command(alias = "i")]
    Install {
        /// channel/package[-version], or a path to a package file
        package: String,

        /// Reinstall even if the package manager objects
        #[arg(short, long)]
        force: bool,

        /// Dependency handling
        #[arg(long, value_enum, value_name = "MODE")]
        deps: Option<DependencyMode>,
    },

    /// Uninstall a package
    #[command(alias = "rm")]
    Uninstall {
        /// channel/package
        package: String,

        /// Remove even if other packages depend on it
        #[arg(short, long)]
        force: bool,
    },

    /// Channel maintenance
    Channel {
        #[command(subcommand)]
        command: ChannelCommands,
    },
}

/// Channel subcommands
#[derive(Subcommand)]
pub enum ChannelCommands {
    /// Discover a channel by its URL
    Discover {
        /// Channel URL
        url: String,
    },
    /// Delete a channel
    Delete {
        /// Channel name
        name: String,
    },
    /// Refresh a channel's definition
    Update {
        /// Channel name
        name: String,
    },
}

impl ChannelCommands {
    /// The channel command and its target
    pub fn into_parts(self) -> (ChannelCommand, String) {
        match self {
            Self::Discover { url } => (ChannelCommand::Discover, url),
            Self::Delete { name } => (ChannelCommand::Delete, name),
            Self::Update { name } => (ChannelCommand::Update, name),
        }
    }
}
