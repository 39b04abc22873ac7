use anyhow::Result;
use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::Router;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::{RestHostModule, RestfulModule};
use runtime::{AppConfig, CliArgs};
use std::path::{Path, PathBuf};
use users_info::UsersInfo;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Users Server - in-memory users CRUD service with generated API docs
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - in-memory users CRUD service with generated API docs")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Write the OpenAPI document and exit
    Openapi {
        /// Output file; parent directories are created
        #[arg(short, long, default_value = "doc/openapi.json")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    // Relative log file paths resolve against the working directory
    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &base_dir);
    tracing::info!("Users Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config).await,
        Commands::Check => check_config(&config),
        Commands::Openapi { out } => export_openapi(&config, &out),
    }
}

/// Wire every module into one router behind the ingress.
fn assemble(config: &AppConfig) -> Result<(ApiIngress, Router)> {
    let ingress = ApiIngress::new(ApiIngressConfig::from_app_config(config)?);

    let users = UsersInfo::new();
    let router = users.register_rest(Router::new(), ingress.as_registry())?;
    let router = ingress.rest_finalize(router)?;

    tracing::info!(operations = ingress.operation_count(), "Modules initialized");
    Ok((ingress, router))
}

async fn run_server(config: &AppConfig) -> Result<()> {
    let (ingress, router) = assemble(config)?;

    let shutdown = async {
        if let Err(e) = modkit::wait_for_shutdown().await {
            tracing::warn!(error = %e, "Signal handling failed; shutting down");
        }
    };

    if let Err(e) = ingress.serve(router, shutdown).await {
        tracing::error!("Server failed: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // Module sections are validated by building them
    ApiIngressConfig::from_app_config(config)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

fn export_openapi(config: &AppConfig, out: &Path) -> Result<()> {
    let (ingress, _router) = assemble(config)?;
    ingress.export_openapi(out)?;
    println!("OpenAPI document written to {}", out.display());
    Ok(())
}
