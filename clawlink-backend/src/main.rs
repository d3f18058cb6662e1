//! `clawlink-backend`: the linker backend.
//!
//! Usage:
//!   clawlink-backend serve   - serve registration, claims and the key set
//!   clawlink-backend keygen  - print a fresh attestation signing key pair

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clawlink_attestation::SigningKey;
use clawlink_backend::{AppState, ServeArgs, serve};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clawlink-backend")]
#[command(about = "Linker backend for clawlink bot ownership")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve(ServeArgs),

    /// Generate an attestation signing key pair
    Keygen,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Keygen => {
            keygen();
            Ok(())
        }
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args
        .into_config()
        .context("invalid backend configuration")?;
    let bind_addr = config.bind_addr;

    if !config.signing_key.can_sign() {
        warn!("ATTESTATION_PRIVATE_KEY not set; claims will fail until it is configured");
    }
    info!(issuer = %config.registry.issuer, "starting clawlink backend");

    let state = AppState::from_config(config).context("failed to build delivery client")?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    serve(listener, state, shutdown_signal())
        .await
        .context("server error")?;
    info!("clawlink backend stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

fn keygen() {
    let key = SigningKey::generate();
    let public = key.verifying_key();

    println!("ATTESTATION_PRIVATE_KEY={}", key.to_base64());
    println!("ATTESTATION_PUBLIC_KEY={}", public.to_base64());
    println!();
    println!("Public key (hex): {}", hex::encode(public.to_bytes()));
}
