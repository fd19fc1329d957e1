//! Example producer uploading a pricing run as a staged batch.
//!
//! Run with: `cargo run --example batch_producer`

use pricecast::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let conn = TcpRequestClient::connect(TcpClientConfig::default()).await?;
    let mut client = BatchClient::new(conn);

    // A small pricing run; sequence 0 lets the server stamp the records.
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_nanos() as u64;
    let records: Vec<PriceRecord> = (1..=5_000)
        .map(|i| PriceRecord {
            instrument_id: i,
            sequence: 0,
            price: i64::from(i) * 1_000,
            source_timestamp: now,
        })
        .collect();

    let batch_id = client.start().await?;
    println!("Opened batch {}", batch_id);

    client.upload_all(batch_id, &records, 1_000).await?;
    println!("Uploaded {} records", records.len());

    client.complete(batch_id).await?;
    println!("Batch {} merged", batch_id);
    Ok(())
}
