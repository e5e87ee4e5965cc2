//! Storefront RPC Server - JSON-RPC backend for the storefront UI.
//!
//! This binary provides a JSON-RPC 2.0 server that wraps the storefront-core
//! library: inventory search, cache control, and the repair-parts catalog.

mod handlers;
mod server;
mod wrapper;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use storefront_core::{CatalogService, GatewaySettings, PartsGatewaySettings};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "storefront-rpc")]
#[command(about = "JSON-RPC server for the storefront catalog")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Inventory REST endpoint
    #[arg(long, env = "STOREFRONT_INVENTORY_URL")]
    inventory_url: String,

    /// Dealer id sent with every inventory request
    #[arg(long, env = "STOREFRONT_DEALER_ID")]
    dealer_id: String,

    /// REST access code sent with every inventory request
    #[arg(long, env = "STOREFRONT_REST_CODE", hide_env_values = true)]
    rest_code: String,

    /// Inventory request timeout in seconds
    #[arg(long, default_value = "180")]
    inventory_timeout: u64,

    /// Parts service base URL (parts loading is disabled without it)
    #[arg(long, env = "STOREFRONT_PARTS_URL")]
    parts_url: Option<String>,

    #[arg(long, env = "STOREFRONT_PARTS_USERNAME", default_value = "")]
    parts_username: String,

    #[arg(long, env = "STOREFRONT_PARTS_PASSWORD", default_value = "", hide_env_values = true)]
    parts_password: String,

    /// Directory for the persisted parts cache (defaults to the user data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Don't warm the inventory cache at startup
    #[arg(long)]
    no_preload: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting Storefront RPC Server");

    let data_dir = match args.data_dir {
        Some(path) => path,
        None => dirs::data_local_dir()
            .map(|dir| dir.join("storefront").join("parts"))
            .context("No user data directory; pass --data-dir")?,
    };
    info!("Parts cache directory: {}", data_dir.display());

    let inventory = GatewaySettings::new(args.inventory_url, args.dealer_id, args.rest_code)
        .with_timeout(Duration::from_secs(args.inventory_timeout));

    let mut builder = CatalogService::builder()
        .with_inventory_gateway(inventory)
        .parts_dir(data_dir)
        .auto_create_dirs(true);

    match args.parts_url {
        Some(url) => {
            builder = builder.with_parts_gateway(PartsGatewaySettings::new(
                url,
                args.parts_username,
                args.parts_password,
            ));
        }
        None => warn!("No parts service URL configured; parts loading is disabled"),
    }

    let service = builder.build()?;

    if !args.no_preload {
        service.preload();
    }

    // Start the server
    let addr = server::start_server(service, &args.host, args.port).await?;

    // Print port for the UI process to read (intentional stdout for IPC)
    println!("RPC_PORT={}", addr.port());

    info!("RPC server running on {}", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
