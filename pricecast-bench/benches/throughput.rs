//! Channel throughput benchmarks.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use pricecast_channel::{broadcast, mpsc, spsc};
use std::hint::black_box;

fn benchmark_spsc_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc_channel");
    group.throughput(Throughput::Elements(1));

    group.bench_function("send_recv", |b| {
        let (mut tx, mut rx) = spsc::channel::<u64>(1024);

        b.iter(|| {
            tx.send(black_box(42)).unwrap();
            black_box(rx.recv().unwrap())
        })
    });

    group.finish();
}

fn benchmark_mpsc_fanin(c: &mut Criterion) {
    let mut group = c.benchmark_group("mpsc_channel");

    for producers in [1usize, 4] {
        group.throughput(Throughput::Elements(producers as u64));
        group.bench_function(format!("{producers}_producers"), |b| {
            let (tx, rx) = mpsc::channel::<u64>(1024);
            let senders: Vec<_> = (0..producers).map(|_| tx.clone()).collect();

            b.iter(|| {
                for tx in &senders {
                    tx.try_send(black_box(42)).unwrap();
                }
                for _ in 0..producers {
                    black_box(rx.try_recv().unwrap());
                }
            })
        });
    }

    group.finish();
}

fn benchmark_broadcast_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast_channel");

    for subscribers in [1usize, 4, 16] {
        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_function(format!("{subscribers}_subscribers"), |b| {
            let tx = broadcast::channel::<u64>(1024);
            let mut receivers: Vec<_> = (0..subscribers).map(|_| tx.subscribe()).collect();

            b.iter(|| {
                tx.send(black_box(42));
                for rx in &mut receivers {
                    black_box(rx.recv().unwrap());
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_spsc_throughput,
    benchmark_mpsc_fanin,
    benchmark_broadcast_fanout
);
criterion_main!(benches);
