// crates/data-lichen-cli/src/main.rs
// ============================================================================
// Module: Data Lichen CLI Entry Point
// Description: Command dispatcher for the Data Lichen registry.
// Purpose: Run the HTTP service and one-shot store and publish tasks.
// Dependencies: clap, data-lichen-config, data-lichen-server, tokio.
// ============================================================================

//! ## Overview
//! The `data-lichen` binary loads one TOML config and either serves the HTTP
//! API or runs a single task against the configured store and broker. Command
//! output is JSON on stdout; logs and errors go to stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod logging;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use data_lichen_config::DataLichenConfig;
use data_lichen_core::MetadataRegistry;
use data_lichen_core::SharedMetadataStore;
use data_lichen_server::DataLichenServer;
use data_lichen_server::build_broker;
use data_lichen_server::build_pipeline;
use data_lichen_server::open_store;
use thiserror::Error;
use tracing::info;

use crate::logging::init_logging;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "data-lichen", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API.
    Serve(ConfigArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Metadata store utilities.
    Store {
        /// Selected store subcommand.
        #[command(subcommand)]
        command: StoreCommand,
    },
    /// Publish the stored metadata once and print the report.
    Publish(ConfigArgs),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Data Lichen configuration file.
    Validate(ConfigArgs),
}

/// Store subcommands.
#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Print the current snapshot as JSON.
    List(ConfigArgs),
}

/// Config file selection shared by every command.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Config file path (defaults to `DATA_LICHEN_CONFIG`, then `data-lichen.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// Result alias for CLI operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        let help = Cli::command().render_help().to_string();
        write_stdout_line(&help).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    };
    match command {
        Commands::Serve(args) => command_serve(&args).await,
        Commands::Config {
            command: ConfigCommand::Validate(args),
        } => command_config_validate(&args),
        Commands::Store {
            command: StoreCommand::List(args),
        } => command_store_list(&args).await,
        Commands::Publish(args) => command_publish(&args).await,
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Loads config, fetches secrets, opens the store, and serves HTTP.
async fn command_serve(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    start_logging(&config)?;
    let server = DataLichenServer::bootstrap(&config)
        .await
        .map_err(|err| CliError::new(format!("startup failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Validates a config file without touching the store or network.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    load_config(args)?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the current snapshot.
async fn command_store_list(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    start_logging(&config)?;
    let store = open_store_blocking(&config).await?;
    let records = MetadataRegistry::new(store)
        .snapshot()
        .await
        .map_err(|err| CliError::new(format!("failed to read metadata: {err}")))?;
    let rendered = serde_json::to_string_pretty(&records)
        .map_err(|err| CliError::new(format!("failed to render metadata: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Runs the publish pipeline once.
async fn command_publish(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    start_logging(&config)?;
    let store = open_store_blocking(&config).await?;
    let broker = build_broker(&config.broker).map_err(|err| CliError::new(err.to_string()))?;
    let pipeline =
        build_pipeline(&config, store, broker).map_err(|err| CliError::new(err.to_string()))?;
    let report = pipeline.publish().await.map_err(|err| CliError::new(err.to_string()))?;
    info!(topic = %report.topic, published = report.published, "publish finished");
    let rendered = serde_json::to_string(&report)
        .map_err(|err| CliError::new(format!("failed to render report: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates config from the selected path.
fn load_config(args: &ConfigArgs) -> CliResult<DataLichenConfig> {
    DataLichenConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Installs logging from config.
fn start_logging(config: &DataLichenConfig) -> CliResult<()> {
    init_logging(&config.logging).map_err(|err| CliError::new(err.to_string()))
}

/// Opens the `SQLite` store off the async runtime.
async fn open_store_blocking(config: &DataLichenConfig) -> CliResult<SharedMetadataStore> {
    let store_config = config.store.clone();
    tokio::task::spawn_blocking(move || open_store(&store_config))
        .await
        .map_err(|err| CliError::new(format!("store open task failed: {err}")))?
        .map_err(|err| CliError::new(err.to_string()))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
