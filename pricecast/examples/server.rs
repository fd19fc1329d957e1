//! Example distribution server publishing over UDP multicast.
//!
//! Run with: `cargo run --example server`

use pricecast::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let feed_config = MulticastConfig::default();
    let publisher = MulticastPublisher::new(feed_config.clone()).await?;

    let listener_config = TcpServerConfig::default();
    let listener = TcpRequestServer::bind(listener_config).await?;
    let addr = listener.local_addr()?;

    let (server, handle) = ServerBuilder::new()
        .config(ServerConfig::new(100_000))
        .publisher(Arc::new(publisher))
        .build(listener)?;

    println!(
        "Starting pricecast server on {} (feed {}:{})",
        addr, feed_config.group, feed_config.port
    );
    println!("Press Ctrl+C to stop");

    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        println!("\nShutting down...");
        if let Some(stats) = shutdown_handle.stats().await {
            println!(
                "Final stats: {} applied, {} stale, {} instruments",
                stats.ingest.applied, stats.ingest.stale, stats.instruments
            );
        }
        shutdown_handle.shutdown();
    });

    server.run().await?;
    Ok(())
}
