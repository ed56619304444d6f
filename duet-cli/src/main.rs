use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use duet_core::{IceServerConfig, RoomCode};
use duet_peer::{
    Link, PeerSession, RtcConnectionFactory, SessionConfig, SessionEvent, SessionState,
    SyntheticMediaSource, WsSignalingChannel,
};
use duet_relay::{RelayConfig, RelayServer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duet")]
#[command(about = "Two-party video call signaling relay and headless peer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the signaling relay.
    Relay {
        #[arg(long, env = "DUET_BIND", default_value = "0.0.0.0:3000")]
        bind: SocketAddr,

        #[arg(long, default_value = "/ws")]
        ws_path: String,
    },
    /// Join a room as a headless peer with synthetic tracks.
    Call {
        #[arg(long, env = "DUET_RELAY_URL", default_value = "ws://127.0.0.1:3000/ws")]
        url: String,

        /// Prompted for when omitted.
        #[arg(long)]
        room: Option<String>,

        #[arg(long, env = "TURN_URL")]
        turn_url: Option<String>,

        #[arg(long, env = "TURN_USERNAME")]
        turn_username: Option<String>,

        #[arg(long, env = "TURN_CREDENTIAL")]
        turn_credential: Option<String>,

        /// Seconds allowed for one offer/answer cycle.
        #[arg(long, default_value_t = 30)]
        negotiation_timeout: u64,
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
        Commands::Relay { bind, ws_path } => run_relay(bind, ws_path).await,
        Commands::Call {
            url,
            room,
            turn_url,
            turn_username,
            turn_credential,
            negotiation_timeout,
        } => {
            let mut ice_servers = IceServerConfig::defaults();
            if let Some(turn_url) = turn_url {
                ice_servers.push(IceServerConfig::turn(
                    turn_url,
                    turn_username,
                    turn_credential,
                ));
            }
            let config = SessionConfig {
                negotiation_timeout: Duration::from_secs(negotiation_timeout),
                ..Default::default()
            };
            run_call(url, room, ice_servers, config).await
        }
    }
}

async fn run_relay(bind: SocketAddr, ws_path: String) -> Result<()> {
    let config = RelayConfig::new(bind).with_ws_path(ws_path);
    let server = RelayServer::bind(config).await?;
    let addr = server.local_addr()?;

    println!("{}", "📡 Duet relay running".green().bold());
    println!("   🔌 ws://{}{}", addr, server.ws_path());

    server
        .serve_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await?;

    println!("{}", "👋 Relay stopped".yellow());
    Ok(())
}

async fn run_call(
    url: String,
    room: Option<String>,
    ice_servers: Vec<IceServerConfig>,
    config: SessionConfig,
) -> Result<()> {
    let room = match room {
        Some(room) => room,
        None => Input::<String>::new()
            .with_prompt("Room code")
            .interact_text()
            .context("Failed to read room code")?,
    };
    let room = RoomCode::from(room.trim().to_uppercase());

    let channel = WsSignalingChannel::connect(&url)
        .await
        .with_context(|| format!("Failed to connect to relay at {}", url))?;
    let (session, handle, mut events) = PeerSession::new(
        config,
        channel,
        Arc::new(RtcConnectionFactory::new(ice_servers)),
        Arc::new(SyntheticMediaSource::new().with_pump()),
    );
    let task = session.spawn();

    println!("{} {}", "📞 Joining room".cyan(), room.as_str().bold());
    handle.join(room).await.context("Failed to join room")?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Hanging up...".yellow());
                handle.end_call().await?;
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                print_event(&event);
                if event == SessionEvent::PeerDisconnected {
                    handle.end_call().await?;
                }
            }
        }
    }

    task.await.context("Session task failed")?;
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::StateChanged(state) => {
            let label = match state {
                SessionState::Idle => "idle".normal(),
                SessionState::WaitingForPeer => "waiting for peer".cyan(),
                SessionState::Negotiating => "negotiating".cyan(),
                SessionState::Connected(Link::Pending) => "connecting".cyan(),
                SessionState::Connected(Link::Live) => "connected".green().bold(),
                SessionState::Closed => "closed".yellow(),
            };
            println!("   • {}", label);
        }
        SessionEvent::RemoteTrack(track) => {
            println!("   🎥 Remote {} track {}", track.kind, track.id);
        }
        SessionEvent::MediaAcquisitionFailed(e) => {
            println!("{} {}", "❌ Media unavailable:".red().bold(), e);
        }
        SessionEvent::NegotiationFailed(e) => {
            println!("{} {}", "❌ Negotiation failed:".red().bold(), e);
        }
        SessionEvent::RoomFull(code) => {
            println!("{} {}", "⛔ Room is full:".red().bold(), code);
        }
        SessionEvent::PeerDisconnected => println!("{}", "👋 Peer left".yellow()),
        SessionEvent::CallEnded => println!("{}", "✨ Call ended".green()),
    }
}
