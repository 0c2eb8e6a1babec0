//! Cartwheel CLI - Load generation and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Simulate 10 shoppers against a local storefront until Ctrl+C
//! cw-cli loadgen --users 10 --checkout-rate 25
//!
//! # Run a short, bounded load with no pauses
//! cw-cli loadgen --wait-secs 0 --iterations 50
//!
//! # Validate a catalog file before deploying it
//! cw-cli catalog check ./catalog.json
//! ```
//!
//! # Commands
//!
//! - `loadgen` - Drive concurrent simulated users against the cart API
//! - `catalog check` - Validate a catalog file and list its products

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use cartwheel_cli::commands::{
    catalog,
    loadgen::{self, LoadgenConfig, LoadgenError},
};
use clap::{Parser, Subcommand};
use tokio::sync::watch;

/// Exit status when the service fails its startup health check.
const EXIT_UNHEALTHY: u8 = 2;

#[derive(Parser)]
#[command(name = "cw-cli")]
#[command(author, version, about = "Cartwheel CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate load against a running storefront
    Loadgen(LoadgenArgs),
    /// Catalog file tools
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(clap::Args)]
struct LoadgenArgs {
    /// Base URL of the storefront
    #[arg(short = 'u', long, env = "BASE_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Number of concurrent users (at least 1)
    #[arg(short = 'c', long, env = "USERS", default_value_t = 1, allow_negative_numbers = true)]
    users: i64,

    /// Percent chance (0-100) to attempt checkout each loop
    #[arg(short = 'r', long, env = "CHECKOUT_RATE", default_value_t = 10, allow_negative_numbers = true)]
    checkout_rate: i64,

    /// Seconds to wait between actions
    #[arg(long, default_value_t = 5)]
    wait_secs: u64,

    /// Loops per user; runs until interrupted if omitted
    #[arg(long)]
    iterations: Option<u64>,

    /// Skip the initial /healthz check
    #[arg(long)]
    skip_health_check: bool,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Validate a catalog file and list its products
    Check {
        /// Path to a JSON catalog file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cartwheel_cli=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Loadgen(args) => run_loadgen(args).await,
        Commands::Catalog {
            action: CatalogAction::Check { path },
        } => check_catalog(&path),
    }
}

async fn run_loadgen(args: LoadgenArgs) -> ExitCode {
    let config = LoadgenConfig::new(args.base_url, args.users, args.checkout_rate)
        .with_wait(Duration::from_secs(args.wait_secs))
        .with_iterations(args.iterations)
        .with_skip_health_check(args.skip_health_check);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    match loadgen::run(config, shutdown_rx).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e @ LoadgenError::Unhealthy(_)) => {
            tracing::error!("{e}. Start the storefront first.");
            ExitCode::from(EXIT_UNHEALTHY)
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::print_stdout)]
fn check_catalog(path: &std::path::Path) -> ExitCode {
    match catalog::check(path) {
        Ok(parsed) => {
            for line in catalog::render(&parsed) {
                println!("{line}");
            }
            tracing::info!(products = parsed.len(), path = %path.display(), "Catalog is valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Signal received, stopping users");
}
