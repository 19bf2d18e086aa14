//! pkgfront - progress and log front-end for package manager operations
//!
//! The CLI hosts the operation controller: it picks a command runner,
//! starts the run on a blocking thread, draws the controller's events and
//! delivers the operator's dismissal back through a controller handle.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod prompt;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use crate::prompt::{dismiss_finished_run, CliPrompter};
use clap::Parser;
use pkgfront_config::Config;
use pkgfront_errors::Error;
use pkgfront_events::{EventReceiver, EventSender};
use pkgfront_ops::{
    CommandRunner, ControllerHandle, OperationController, ProcessRunner, Prompter, RunOutcome,
    ScriptRunner,
};
use pkgfront_types::{
    ChannelCommand, ColorChoice, DependencyMode, InstallOptions, OperationKind, OperationTarget,
    PackageSpec,
};
use std::path::Path;
use std::process;
use tokio::select;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    // 2. Merge environment variables
    // 3. Apply CLI flags (highest precedence)
    let config = match load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    init_tracing(json_mode, cli.global.debug, &config.log_dir());

    match run(cli, config).await {
        Ok(Some(outcome)) if outcome.has_error => process::exit(1),
        Ok(_) => {}
        Err(e) => {
            error!("Application error: {}", e);
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

async fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    if let Some(color) = cli.global.color {
        config.general.color = color;
    }
    Ok(config)
}

/// Main application logic; `None` when the operator called the run off
async fn run(cli: Cli, config: Config) -> Result<Option<RunOutcome>, CliError> {
    info!("Starting pkgfront v{}", env!("CARGO_PKG_VERSION"));

    let json_mode = cli.global.json;
    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    console::set_colors_enabled(colors_enabled);
    console::set_colors_enabled_stderr(colors_enabled);

    let operation = Operation::from_command(cli.command, config.install.dependencies)?;

    // Nobody can be asked in JSON mode or without a terminal
    let attended = !json_mode && console::user_attended_stderr();
    let answer = if cli.global.yes {
        Some(true)
    } else if attended {
        None
    } else {
        Some(config.ui.confirm_default)
    };
    let interactive_dismiss = attended && !cli.global.yes && !config.ui.auto_dismiss;

    let (event_sender, event_receiver) = pkgfront_events::channel();
    let bar = EventHandler::progress_bar(json_mode);
    let mut prompter = CliPrompter::new(bar.clone(), answer);

    if let Some(channel) = operation.channel_to_remove() {
        let prompt = format!("Do you want to remove channel \"{channel}\"");
        if !prompter.confirm(&prompt, false) {
            info!(channel, "Channel removal declined");
            if !json_mode {
                eprintln!("Channel {channel} was not removed");
            }
            return Ok(None);
        }
    }

    let mut event_handler = EventHandler::new(bar, json_mode);

    let (task, handle) = match &cli.global.replay {
        Some(script) => {
            let runner = ScriptRunner::load(script).await?;
            spawn_run(runner, prompter, event_sender, operation)
        }
        None => {
            let runner = ProcessRunner::new(config.runner.program.clone())
                .with_extra_args(config.runner.extra_args.clone());
            spawn_run(runner, prompter, event_sender, operation)
        }
    };

    let outcome = handle_events(
        task,
        &handle,
        event_receiver,
        &mut event_handler,
        interactive_dismiss,
    )
    .await?;

    OutputRenderer::new(json_mode).render_outcome(&outcome)?;
    info!(has_error = outcome.has_error, "Command completed");
    Ok(Some(outcome))
}

/// Run the controller on a blocking thread; the runner calls back
/// synchronously and must not stall event rendering
fn spawn_run<R: CommandRunner + 'static>(
    runner: R,
    prompter: CliPrompter,
    event_sender: EventSender,
    operation: Operation,
) -> (JoinHandle<Result<RunOutcome, Error>>, ControllerHandle) {
    let mut controller = OperationController::new(runner)
        .with_event_sender(event_sender)
        .with_prompter(prompter);
    let handle = controller.handle();
    let runtime = tokio::runtime::Handle::current();
    let task = tokio::task::spawn_blocking(move || {
        runtime.block_on(operation.execute(&mut controller))
    });
    (task, handle)
}

/// Draw events concurrently with the run and dismiss it once finished
async fn handle_events(
    mut task: JoinHandle<Result<RunOutcome, Error>>,
    handle: &ControllerHandle,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
    interactive_dismiss: bool,
) -> Result<RunOutcome, CliError> {
    loop {
        select! {
            // Run completed
            result = &mut task => {
                // Drain any remaining events
                while let Ok(message) = event_receiver.try_recv() {
                    logging::log_event_with_tracing(&message);
                    event_handler.handle_event(message);
                }
                let outcome = result.map_err(|e| Error::internal(e.to_string()))??;
                return Ok(outcome);
            }

            // Event received
            message = event_receiver.recv() => {
                let Some(message) = message else {
                    // Controller gone; only the task result is left
                    let outcome = (&mut task).await.map_err(|e| Error::internal(e.to_string()))??;
                    return Ok(outcome);
                };
                logging::log_event_with_tracing(&message);
                if event_handler.handle_event(message) {
                    dismiss_finished_run(handle, interactive_dismiss).await?;
                }
            }
        }
    }
}

/// What the command line asked for
enum Operation {
    Install {
        target: OperationTarget,
        options: InstallOptions,
    },
    Uninstall {
        spec: PackageSpec,
        options: InstallOptions,
    },
    Channel {
        command: ChannelCommand,
        target: String,
    },
}

impl Operation {
    /// `default_deps` applies when the command line chose no dependency mode
    fn from_command(
        command: Commands,
        default_deps: Option<DependencyMode>,
    ) -> Result<Self, CliError> {
        Ok(match command {
            Commands::Install {
                package,
                force,
                deps,
            } => Self::Install {
                target: OperationTarget::parse_package_or_file(&package)?,
                options: InstallOptions {
                    dependencies: deps.or(default_deps),
                    force,
                },
            },
            Commands::Uninstall { package, force } => Self::Uninstall {
                spec: PackageSpec::parse(&package)?,
                options: InstallOptions {
                    dependencies: None,
                    force,
                },
            },
            Commands::Channel { command } => {
                let (command, target) = command.into_parts();
                if target.trim().is_empty() {
                    return Err(CliError::InvalidArguments(
                        "channel name must not be empty".to_string(),
                    ));
                }
                Self::Channel { command, target }
            }
        })
    }

    /// Channel a delete would remove; asked about before the run starts
    fn channel_to_remove(&self) -> Option<&str> {
        match self {
            Self::Channel {
                command: ChannelCommand::Delete,
                target,
            } => Some(target),
            _ => None,
        }
    }

    async fn execute<R: CommandRunner>(
        self,
        controller: &mut OperationController<R>,
    ) -> Result<RunOutcome, Error> {
        match self {
            Self::Install { target, options } => match target {
                OperationTarget::File(path) => {
                    controller
                        .install_package(None, &path.display().to_string(), None, options)
                        .await
                }
                OperationTarget::Package(spec) => {
                    controller
                        .install_package(
                            Some(&spec.channel),
                            &spec.package,
                            spec.version.as_deref(),
                            options,
                        )
                        .await
                }
                other => {
                    controller
                        .start(OperationKind::Install, other, options, true)
                        .await
                }
            },
            Self::Uninstall { spec, options } => {
                controller
                    .uninstall_package(&spec.channel, &spec.package, options)
                    .await
            }
            Self::Channel { command, target } => controller.channel_command(command, &target).await,
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, log_dir: &Path) {
    // Check if debug logging is enabled
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs to file, never to the terminal
        // the progress surface is drawn on
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "pkgfront-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| {
                                tracing_subscriber::EnvFilter::new(
                                    "info,pkgfront=debug,pkgfront_ops=debug",
                                )
                            },
                        ),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    // Normal mode: the progress surface owns the terminal
    tracing_subscriber::fmt()
        .with_writer(std::io::sink)
        .with_env_filter("off")
        .init();
}
