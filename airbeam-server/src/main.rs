use airbeam_server::{AppState, ClientChannels, RelayCommand, SignalingRelay, ws_handler};
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, info};

#[derive(Parser)]
#[command(name = "airbeam-server", about = "Signaling relay for airbeam peers")]
struct Args {
    /// Address to bind the relay on.
    #[arg(long, env = "AIRBEAM_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind the relay on.
    #[arg(long, env = "AIRBEAM_PORT", default_value_t = 3001)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args = Args::parse();

    info!("Initializing signaling relay...");

    let channels = ClientChannels::new();
    let (relay_tx, relay_rx) = mpsc::channel::<RelayCommand>(256);

    let relay = SignalingRelay::new(relay_rx, Arc::new(channels.clone()));
    tokio::spawn(relay.run());

    // Browser clients connect from another origin during development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(AppState { channels, relay_tx });

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("invalid bind address")?;
    info!("Signaling relay listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
