//! Criterion benchmarks over representative payloads
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lazy_static::lazy_static;
use proto_parse::{
    decode, encode, Cardinality, FieldDef, FieldKind, Message, MessageSchema, Value,
};

lazy_static! {
    static ref TIMESTAMP: MessageSchema = MessageSchema::new(
        "proto.Timestamp",
        vec![
            FieldDef::new(1, "seconds", FieldKind::Int64, Cardinality::Optional),
            FieldDef::new(2, "nanos", FieldKind::Int32, Cardinality::Optional),
        ],
    );
    static ref TELEMETRY: MessageSchema = MessageSchema::new(
        "proto.Telemetry",
        vec![
            FieldDef::new(1, "source", FieldKind::String, Cardinality::Optional),
            FieldDef::packed(2, "samples", FieldKind::Sint64),
            FieldDef::new(3, "checksum", FieldKind::Fixed64, Cardinality::Optional),
        ],
    );
}

fn timestamp_bytes() -> Vec<u8> {
    let mut m = Message::new();
    m.set(1, Value::Int64(5678));
    m.set(2, Value::Int32(1234));
    encode(&m, &TIMESTAMP).unwrap()
}

fn telemetry_bytes(samples: usize) -> Vec<u8> {
    let mut m = Message::new();
    m.set(1, Value::String("sensor-7".into()));
    for i in 0..samples {
        m.push(2, Value::Sint64(i as i64 - samples as i64 / 2));
    }
    m.set(3, Value::Fixed64(0xdead_beef_cafe_f00d));
    encode(&m, &TELEMETRY).unwrap()
}

fn bench_timestamp(c: &mut Criterion) {
    let bytes = timestamp_bytes();
    let mut group = c.benchmark_group("timestamp");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("decode", |b| {
        b.iter(|| decode(black_box(&bytes), &TIMESTAMP).unwrap())
    });

    let message = decode(&bytes, &TIMESTAMP).unwrap();
    group.bench_function("encode", |b| {
        b.iter(|| encode(black_box(&message), &TIMESTAMP).unwrap())
    });

    group.finish();
}

fn bench_telemetry(c: &mut Criterion) {
    let mut group = c.benchmark_group("telemetry");

    for samples in [16usize, 256, 4096] {
        let bytes = telemetry_bytes(samples);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_function(format!("decode_{samples}"), |b| {
            b.iter(|| decode(black_box(&bytes), &TELEMETRY).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_timestamp, bench_telemetry);
criterion_main!(benches);
