//! Example consumer joining the feed mid-stream.
//!
//! Run with: `cargo run --example consumer`

use pricecast::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let feed = MulticastSubscriber::new(MulticastConfig::default()).await?;
    let conn = TcpRequestClient::connect(TcpClientConfig::default()).await?;

    let (mut consumer, mut events) = Consumer::new(conn, feed, ConsumerConfig::default());
    let view = consumer.view();

    println!("Joining...");
    consumer.join().await?;
    println!("Live with {} instruments", view.len());

    tokio::spawn(consumer.run());

    // Print session events as they arrive until Ctrl+C.
    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = tokio::time::sleep(std::time::Duration::from_millis(10)) => {
                while let Some(event) = events.recv() {
                    match event {
                        SessionEvent::Updated(record) => println!(
                            "[Consumer] instrument {} -> {} (seq {})",
                            record.instrument_id, record.price, record.sequence
                        ),
                        SessionEvent::GapDetected { instrument_id, missed, .. } => println!(
                            "[Consumer] gap on instrument {}: {} updates missed",
                            instrument_id, missed
                        ),
                        SessionEvent::StateChanged(state) => {
                            println!("[Consumer] state -> {:?}", state);
                        }
                    }
                }
            }
        }
    }

    println!("\nFinal view: {} instruments", view.len());
    Ok(())
}
