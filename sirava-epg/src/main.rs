//! sirava-epg - Rundown to program guide converter
//!
//! Two modes:
//! - `convert` (default): convert a rundown file into `output.xml`
//! - `serve`: HTTP upload service that accumulates days in the stored guide

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sirava_common::config::TomlConfig;
use sirava_common::{time, FileScheduleStore};
use sirava_epg::convert::{run_convert, ConvertOptions, DEFAULT_INPUT};
use sirava_epg::{build_router, logging, AppState};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for sirava-epg
#[derive(Parser, Debug)]
#[command(name = "sirava-epg")]
#[command(about = "Converts playout rundowns into the Širava program guide XML")]
#[command(version)]
struct Args {
    /// Config file (default: ~/.config/sirava/config.toml)
    #[arg(short, long, global = true, env = "SIRAVA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a rundown file (default when no subcommand is given)
    Convert(ConvertArgs),
    /// Run the HTTP upload service
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug, Default)]
struct ConvertArgs {
    /// Rundown JSON to read
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Guide XML to write (default: store_path from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Merge into the existing output instead of replacing it
    #[arg(long)]
    append: bool,
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Listen address
    #[arg(short, long, env = "SIRAVA_BIND")]
    bind: Option<SocketAddr>,

    /// Persisted guide document
    #[arg(short, long, env = "SIRAVA_STORE")]
    store: Option<PathBuf>,

    /// Directory served for non-API paths
    #[arg(long, env = "SIRAVA_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing before anything logs (RUST_LOG overrides the configured level)
    let log_filter = logging::init_tracing();

    info!(
        "Starting sirava-epg v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    log_filter.apply_config(&config.logging.level)?;

    match args.command.unwrap_or(Command::Convert(ConvertArgs::default())) {
        Command::Convert(convert) => run_cli(convert, config),
        Command::Serve(serve) => run_server(serve, config).await,
    }
}

fn run_cli(args: ConvertArgs, config: TomlConfig) -> Result<()> {
    let options = ConvertOptions {
        input: args.input.unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
        output: args.output.unwrap_or(config.store_path),
        append: args.append,
    };

    let summary = run_convert(&options, time::today())?;
    println!(
        "Generated {} ({}: {} entries)",
        summary.output.display(),
        summary.date,
        summary.entries
    );
    Ok(())
}

async fn run_server(args: ServeArgs, config: TomlConfig) -> Result<()> {
    let addr = args.bind.unwrap_or(config.bind_address);
    let store_path = args.store.unwrap_or(config.store_path);
    let static_dir = args.static_dir.unwrap_or(config.static_dir);

    info!("Guide store: {}", store_path.display());
    info!("Static files: {}", static_dir.display());

    let state = AppState::new(Arc::new(FileScheduleStore::new(store_path)), static_dir);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("sirava-epg listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A signal source that cannot be installed is logged and never fires; the
/// other one still stops the server.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("Ctrl+C received, finishing in-flight uploads"),
        _ = terminate => info!("SIGTERM received, finishing in-flight uploads"),
    }
}
