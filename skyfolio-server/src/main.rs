use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use skyfolio_server::{
    AppState, create_app,
    infra::config::{ConfigLoad, ConfigLoader, ConfigWarnings},
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "skyfolio-server")]
#[command(about = "Portfolio media server with multi-tier thumbnail generation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Path to a skyfolio.toml configuration file
    #[arg(short, long, env = "SKYFOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// Alternate .env file to load before reading the environment
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the configuration, print it with any warnings and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();

    match cli.command {
        Some(Command::CheckConfig) => check_config(&cli.serve),
        None => run_server(cli.serve).await,
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn loader_for(args: &ServeArgs) -> ConfigLoader {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path);
    }
    loader
}

fn log_warnings(warnings: &ConfigWarnings) {
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }
}

fn check_config(args: &ServeArgs) -> anyhow::Result<()> {
    let ConfigLoad { config, warnings } = loader_for(args)
        .dry_run()
        .load()
        .context("failed to load configuration")?;
    log_warnings(&warnings);
    println!("{config:#?}");
    Ok(())
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let ConfigLoad {
        mut config,
        warnings,
    } = loader_for(&args)
        .load()
        .context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    log_warnings(&warnings);

    let addr = config.bind_address();
    let state = AppState::new(config)?;
    let shutdown = state.shutdown.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Starting Skyfolio server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for shutdown signal: {err}");
            }
            info!("shutdown requested");
            shutdown.cancel();
        })
        .await
        .context("server error")?;

    Ok(())
}
