//! Full-stack tests: a real server and real clients over the in-process
//! transport.

use pricecast::prelude::*;
use pricecast_server::IngestStats;
use std::sync::Arc;
use std::time::Duration;

struct Stack {
    feed: loopback::LoopbackFeed,
    connector: loopback::LoopbackConnector,
    handle: ServerHandle,
}

/// Spins up a server over the loopback transport.
fn start_stack(capacity: usize) -> Stack {
    // Deep enough that no test can lag a subscriber into frame loss.
    let feed = loopback::feed(8192);
    let (connector, listener) = loopback::request_channel(64);

    let (server, handle) = ServerBuilder::new()
        .config(ServerConfig::new(capacity))
        .publisher(Arc::new(feed.clone()))
        .build(listener)
        .unwrap();
    tokio::spawn(server.run());

    Stack {
        feed,
        connector,
        handle,
    }
}

fn record(instrument_id: u32, price: i64, source_timestamp: u64) -> PriceRecord {
    PriceRecord {
        instrument_id,
        sequence: 0,
        price,
        source_timestamp,
    }
}

/// Polls until the condition holds or the deadline passes.
async fn wait_for<F: FnMut() -> bool>(mut condition: F) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not met within deadline");
}

/// Polls the engine counters until the predicate holds.
async fn wait_for_ingest<F: Fn(IngestStats) -> bool>(handle: &ServerHandle, predicate: F) {
    for _ in 0..500 {
        if let Some(stats) = handle.stats().await
            && predicate(stats.ingest)
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("ingest counters did not reach expected state");
}

#[tokio::test]
async fn test_consumer_joins_mid_stream() {
    let stack = start_stack(1_000);

    // A producer publishes before any consumer exists; the snapshot must
    // carry these.
    let mut producer = BatchClient::new(stack.connector.connect().await.unwrap());
    producer.publish(record(1, 100, 10)).await.unwrap();
    producer.publish(record(2, 200, 10)).await.unwrap();
    producer.publish(record(1, 101, 11)).await.unwrap();
    wait_for_ingest(&stack.handle, |ingest| ingest.applied == 3).await;

    let (mut consumer, _events) = Consumer::new(
        stack.connector.connect().await.unwrap(),
        stack.feed.subscribe(),
        ConsumerConfig::default(),
    );
    consumer.join().await.unwrap();
    assert_eq!(consumer.state(), SessionState::Live);

    let view = consumer.view();
    assert_eq!(view.get(1).unwrap().price, 101);
    assert_eq!(view.get(2).unwrap().price, 200);
    assert_eq!(view.len(), 2);

    // Live updates republished by the server reach the joined consumer.
    tokio::spawn(consumer.run());
    producer.publish(record(2, 201, 12)).await.unwrap();

    let view2 = view.clone();
    wait_for(move || view2.get(2).map(|e| e.price) == Some(201)).await;

    // The server stamped per-instrument sequences: two updates each.
    assert_eq!(view.get(1).unwrap().sequence, 2);
    assert_eq!(view.get(2).unwrap().sequence, 2);
}

#[tokio::test]
async fn test_batch_merge_reaches_consumers() {
    let stack = start_stack(10_000);

    let (mut consumer, _events) = Consumer::new(
        stack.connector.connect().await.unwrap(),
        stack.feed.subscribe(),
        ConsumerConfig::default(),
    );
    consumer.join().await.unwrap();
    let view = consumer.view();
    tokio::spawn(consumer.run());

    // Stage a pricing run and merge it.
    let mut producer = BatchClient::new(stack.connector.connect().await.unwrap());
    let batch_id = producer.start().await.unwrap();
    let records: Vec<_> = (1..=2_500u32)
        .map(|i| record(i, i64::from(i) * 10, 5))
        .collect();
    producer.upload_all(batch_id, &records, 1_000).await.unwrap();
    producer.complete(batch_id).await.unwrap();

    // The merge flows out as ordinary incrementals.
    let view2 = view.clone();
    wait_for(move || view2.len() == 2_500).await;
    assert_eq!(view.get(2_500).unwrap().price, 25_000);

    let stats = stack.handle.stats().await.unwrap();
    assert_eq!(stats.ingest.applied, 2_500);
    assert_eq!(stats.open_batches, 0);
}

#[tokio::test]
async fn test_cancelled_batch_stays_invisible() {
    let stack = start_stack(1_000);

    let mut producer = BatchClient::new(stack.connector.connect().await.unwrap());
    let batch_id = producer.start().await.unwrap();
    producer.upload(batch_id, &[record(1, 100, 5)]).await.unwrap();
    producer.cancel(batch_id).await.unwrap();

    // Uploading into the cancelled batch now fails.
    let err = producer
        .upload(batch_id, &[record(2, 200, 5)])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Rejected {
            status: Status::BatchNotFound
        }
    ));

    let (mut consumer, _events) = Consumer::new(
        stack.connector.connect().await.unwrap(),
        stack.feed.subscribe(),
        ConsumerConfig::default(),
    );
    consumer.join().await.unwrap();
    assert!(consumer.view().is_empty());
}

#[tokio::test]
async fn test_redelivered_update_is_idempotent() {
    let stack = start_stack(1_000);

    let mut producer = BatchClient::new(stack.connector.connect().await.unwrap());
    producer.publish(record(1, 100, 10)).await.unwrap();

    // Redeliver the stamped record; the strictly-greater rule drops it.
    let stamped = PriceRecord {
        instrument_id: 1,
        sequence: 1,
        price: 999,
        source_timestamp: 10,
    };
    producer.publish(stamped).await.unwrap();
    wait_for_ingest(&stack.handle, |ingest| ingest.stale == 1).await;

    let (mut consumer, _events) = Consumer::new(
        stack.connector.connect().await.unwrap(),
        stack.feed.subscribe(),
        ConsumerConfig::default(),
    );
    consumer.join().await.unwrap();
    assert_eq!(consumer.view().get(1).unwrap().price, 100);
}

#[tokio::test]
async fn test_shutdown_stops_the_engine() {
    let stack = start_stack(100);

    let mut producer = BatchClient::new(stack.connector.connect().await.unwrap());
    producer.publish(record(1, 100, 1)).await.unwrap();
    wait_for_ingest(&stack.handle, |ingest| ingest.applied == 1).await;

    stack.handle.shutdown();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(stack.handle.stats().await.is_none());
}
