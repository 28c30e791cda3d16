/// Main entry point for the Life Tracker MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use life_tracker_mcp::{Args, Config, LifeTrackerServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // RUST_LOG wins over the command line flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("life_tracker_mcp={}", args.log_level())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    info!("Starting Life Tracker MCP server");

    let config = Config::from_args(&args)?;
    info!("Using database at: {}", config.database.display());
    info!("Using local flags at: {}", config.flags_file.display());

    let server = LifeTrackerServer::new(config).await?;

    // Run the MCP server - this will handle JSON-RPC communication over stdin/stdout
    server.run().await?;

    info!("Life Tracker MCP server shutdown complete");
    Ok(())
}
