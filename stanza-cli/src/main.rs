use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stanza_client::{AlwaysGranted, CallController, PermissionGate, StatusSink};
use stanza_core::{ClientConfig, RemoteTrack, SignalingState};

#[derive(Parser)]
#[command(name = "stanza")]
#[command(about = "Peer-to-peer call client for a Socket.IO room relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ConfigArgs {
    /// JSON client configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    room: Option<String>,

    /// Relay base URL, e.g. http://localhost:3030
    #[arg(long)]
    url: Option<String>,

    #[arg(long)]
    token: Option<String>,

    #[arg(long)]
    peer_id: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a room and stay in the call until Ctrl-C.
    Call {
        #[command(flatten)]
        config: ConfigArgs,

        /// Skip the media permission prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Validate the configuration and print the relay endpoint.
    CheckConfig {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Call { config, yes } => run_call(load_config(config)?, yes).await,
        Commands::CheckConfig { config } => check_config(load_config(config)?),
    }
}

fn load_config(args: ConfigArgs) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::default(),
    };

    if let Some(room) = args.room {
        config.room = room;
    }
    if let Some(url) = args.url {
        config.relay.base_url = url;
    }
    if let Some(token) = args.token {
        config.relay.auth_token = Some(token);
    }
    if let Some(peer_id) = args.peer_id {
        config.relay.peer_id = Some(peer_id);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn check_config(config: ClientConfig) -> Result<()> {
    let peer_id = config.peer_id();
    let endpoint = config.relay.endpoint(&peer_id)?;

    println!("{}", "Configuration is valid".green().bold());
    println!("   Room:     {}", config.room);
    println!("   Relay:    {}", endpoint);
    println!("   Peer:     {}", peer_id);
    println!("   ICE:      {} server(s)", config.ice_servers.len());
    if config.retry.enabled {
        println!(
            "   Retry:    {} attempts, {} ms apart",
            config.retry.max_retries, config.retry.delay_ms
        );
    } else {
        println!("   Retry:    disabled");
    }
    Ok(())
}

async fn run_call(config: ClientConfig, yes: bool) -> Result<()> {
    println!(
        "{}",
        format!("Calling into room '{}'", config.room).green().bold()
    );

    let controller = CallController::from_config(&config, Arc::new(TerminalStatus))?;
    let handle = if yes {
        controller.start(&AlwaysGranted).await?
    } else {
        controller.start(&PromptGate).await?
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Hanging up");

    handle.shutdown().await?;
    println!("{}", "Call ended".cyan());
    Ok(())
}

/// Prints every state change as a colored status line.
struct TerminalStatus;

impl StatusSink for TerminalStatus {
    fn on_state(&self, state: SignalingState) {
        let label = state.label();
        let line = match state {
            SignalingState::Done => label.green().bold(),
            SignalingState::Disconnected | SignalingState::Full => label.red(),
            _ => label.cyan(),
        };
        println!("{} {}", "●".dimmed(), line);
    }

    fn on_remote_track(&self, track: &RemoteTrack) {
        println!(
            "{} remote {} track {}",
            "♪".dimmed(),
            track.kind.to_string().yellow(),
            track.track_id
        );
    }
}

/// Asks on the terminal before microphone and camera are used.
struct PromptGate;

#[async_trait]
impl PermissionGate for PromptGate {
    async fn request(&self) -> bool {
        let answer = tokio::task::spawn_blocking(|| {
            Confirm::new()
                .with_prompt("Allow access to microphone and camera?")
                .default(true)
                .interact()
        })
        .await;

        match answer {
            Ok(Ok(granted)) => granted,
            Ok(Err(e)) => {
                warn!("Permission prompt failed: {}", e);
                false
            }
            Err(e) => {
                warn!("Permission prompt task failed: {}", e);
                false
            }
        }
    }
}
