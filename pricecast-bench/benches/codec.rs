//! Wire codec benchmarks.

use criterion::{Criterion, criterion_group, criterion_main};
use pricecast_core::buffer::{AlignedBuffer, ReadBuffer, WriteBuffer};
use pricecast_core::{FrameHeader, PriceRecord, PriceUpdate, SnapshotResponse, message_type};
use std::hint::black_box;

fn sample_record() -> PriceRecord {
    PriceRecord {
        instrument_id: 42,
        sequence: 1_000_001,
        price: 123_456_789,
        source_timestamp: 1_700_000_000_000_000_000,
    }
}

fn benchmark_header_encode(c: &mut Criterion) {
    let mut buffer = AlignedBuffer::<64>::new();
    let header = FrameHeader::new(message_type::PRICE_UPDATE, 32);

    c.bench_function("header_encode", |b| {
        b.iter(|| {
            header.encode(black_box(buffer.as_mut_slice()), 0);
        })
    });
}

fn benchmark_header_decode(c: &mut Criterion) {
    let mut buffer = AlignedBuffer::<64>::new();
    FrameHeader::new(message_type::PRICE_UPDATE, 32).encode(buffer.as_mut_slice(), 0);

    c.bench_function("header_decode", |b| {
        b.iter(|| FrameHeader::decode(black_box(buffer.as_slice())))
    });
}

fn benchmark_record_codec(c: &mut Criterion) {
    let mut buffer = AlignedBuffer::<64>::new();
    let record = sample_record();

    c.bench_function("record_encode", |b| {
        b.iter(|| {
            record.encode(black_box(buffer.as_mut_slice()), 0);
        })
    });

    record.encode(buffer.as_mut_slice(), 0);
    c.bench_function("record_decode", |b| {
        b.iter(|| black_box(PriceRecord::decode(buffer.as_slice(), 0)))
    });
}

fn benchmark_update_frame(c: &mut Criterion) {
    let mut buffer = AlignedBuffer::<64>::new();
    let update = PriceUpdate {
        record: sample_record(),
    };

    c.bench_function("update_frame_encode", |b| {
        b.iter(|| update.encode(black_box(buffer.as_mut_slice())).unwrap())
    });

    update.encode(buffer.as_mut_slice()).unwrap();
    c.bench_function("update_frame_decode", |b| {
        b.iter(|| PriceUpdate::decode(black_box(buffer.as_slice())).unwrap())
    });
}

fn benchmark_snapshot_encode(c: &mut Criterion) {
    let response = SnapshotResponse {
        request_id: 1,
        entries: (0..1_000u32)
            .map(|i| PriceRecord {
                instrument_id: i,
                sequence: u64::from(i) + 1,
                price: i64::from(i) * 100,
                source_timestamp: 7,
            })
            .collect(),
    };
    let mut buffer = vec![0u8; response.frame_length()];

    c.bench_function("snapshot_encode_1k", |b| {
        b.iter(|| response.encode(black_box(&mut buffer[..])).unwrap())
    });

    response.encode(&mut buffer[..]).unwrap();
    c.bench_function("snapshot_decode_1k", |b| {
        b.iter(|| SnapshotResponse::decode(black_box(&buffer[..])).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_header_encode,
    benchmark_header_decode,
    benchmark_record_codec,
    benchmark_update_frame,
    benchmark_snapshot_encode,
);
criterion_main!(benches);
