//! `clawlink-identity`: run a bot identity and link it to an owner.
//!
//! Usage:
//!   clawlink-identity serve     - load/create keypair, register, serve identity routes
//!   clawlink-identity sync      - re-fetch this bot's attestation from the backend
//!   clawlink-identity show-key  - print the bot public key

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clawlink::BotId;
use clawlink_identity::{
    AttestationCache, FileAttestationCache, FileKeyStorage, IdentityState, Keypair, LinkerClient,
    claim_banner, serve, sync_attestation,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clawlink-identity")]
#[command(about = "Bot identity server for clawlink ownership linking")]
#[command(version)]
struct Cli {
    /// Directory holding identity.key, identity.pub and attestation.json
    #[arg(long, env = "CLAWLINK_HOME")]
    home: Option<PathBuf>,

    /// Linker backend base URL
    #[arg(long, env = "CLAWLINK_LINKER_URL", default_value = "http://localhost:3000")]
    linker_url: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register with the backend and serve the identity routes
    Serve {
        /// Bot display name
        #[arg(long, env = "CLAWLINK_BOT_NAME", default_value = "my-clawbot")]
        name: String,
        /// Port for the identity server
        #[arg(short, long, env = "CLAWLINK_PORT", default_value_t = 3001)]
        port: u16,
        /// Endpoint advertised to the backend (default http://localhost:<port>)
        #[arg(long, env = "CLAWLINK_ENDPOINT")]
        endpoint: Option<String>,
    },

    /// Re-fetch the attestation for a claimed bot into the local cache
    Sync {
        /// Bot id returned at registration
        #[arg(long)]
        bot_id: String,
    },

    /// Print the bot public key, creating the keypair if needed
    ShowKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let home = match cli.home {
        Some(home) => home,
        None => default_home()?,
    };

    match cli.command {
        Commands::Serve {
            name,
            port,
            endpoint,
        } => run_serve(&home, &cli.linker_url, &name, port, endpoint).await,
        Commands::Sync { bot_id } => run_sync(&home, &cli.linker_url, &bot_id).await,
        Commands::ShowKey => {
            let keypair = load_keypair(&home)?;
            println!("{}", keypair.public_key());
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

fn default_home() -> Result<PathBuf> {
    let home = std::env::var_os("HOME").context("HOME is not set; pass --home or CLAWLINK_HOME")?;
    Ok(PathBuf::from(home).join(".clawlink"))
}

fn load_keypair(home: &std::path::Path) -> Result<Keypair> {
    Keypair::load_or_create(&FileKeyStorage::new(home))
        .with_context(|| format!("loading identity keypair from {}", home.display()))
}

async fn run_serve(
    home: &std::path::Path,
    linker_url: &str,
    name: &str,
    port: u16,
    endpoint: Option<String>,
) -> Result<()> {
    let keypair = load_keypair(home)?;
    info!(public_key = %keypair.public_key(), "identity keypair ready");

    let cache = Arc::new(FileAttestationCache::new(home));
    match cache.load() {
        Ok(Some(attestation)) => info!(owner = %attestation.alien_id, "already claimed"),
        Ok(None) => {}
        Err(err) => warn!(error = %err, "ignoring unreadable attestation cache"),
    }

    let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
        .await
        .with_context(|| format!("binding identity server to port {port}"))?;

    let endpoint = endpoint.unwrap_or_else(|| format!("http://localhost:{port}"));
    let client = LinkerClient::new(linker_url)?;
    info!(linker = %client.base_url(), %endpoint, "registering");
    let registration = client
        .register(keypair.public_key(), name, Some(&endpoint))
        .await
        .context("registering with the linker backend")?;

    println!("{}", claim_banner(&registration.bot_id, &registration.claim_code));

    let state = IdentityState::new(keypair, cache);
    serve(listener, state)
        .await
        .context("identity server stopped")
}

async fn run_sync(home: &std::path::Path, linker_url: &str, bot_id: &str) -> Result<()> {
    let bot_id = BotId::parse(bot_id).context("invalid bot id")?;
    let keypair = load_keypair(home)?;
    let client = LinkerClient::new(linker_url)?;
    let cache: Arc<dyn AttestationCache> = Arc::new(FileAttestationCache::new(home));

    let Some(attestation) = sync_attestation(&client, &bot_id, &keypair, &cache).await? else {
        println!("{bot_id} is not claimed yet");
        return Ok(());
    };

    println!(
        "cached attestation for {bot_id}, owned by {} until {}",
        attestation.alien_id, attestation.expires_at
    );
    Ok(())
}
