//! Benchmarks for the PBO container
//!
//! This benchmark suite evaluates:
//! - Header parsing and payload index construction for growing entry counts
//! - Archive building (header + payloads + trailer) through the writer
//! - Trailer digest throughput for SHA-1 and CRC-32

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lpbo_archive::{PboReader, PboWriter, WriteOptions};
use lpbo_core::{ChecksumAlgorithm, Crc32Checksum, Sha1Checksum};
use std::hint::black_box;
use std::io::Cursor;

/// Build an archive with `count` small entries spread over a few folders.
fn archive(count: usize, payload: usize) -> Vec<u8> {
    let mut writer = PboWriter::new(Vec::new());
    writer.add_extension("prefix", "x\\bench");
    for i in 0..count {
        let name = format!("folder{}\\file{i:05}.sqf", i % 16);
        let data: Vec<u8> = (0..payload).map(|j| (i + j) as u8).collect();
        writer.add_file(&name, data).unwrap();
    }
    writer.finish().unwrap()
}

/// Benchmark opening an archive (header FSM + payload index)
fn bench_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("open");

    for count in [10usize, 100, 1_000, 10_000] {
        let data = archive(count, 16);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &data, |b, data| {
            b.iter(|| {
                let reader = PboReader::new(Cursor::new(black_box(data.as_slice())));
                black_box(reader.unwrap().len());
            });
        });
    }

    group.finish();
}

/// Benchmark building archives through the writer
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for count in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(archive(count, 64).len()));
        });
    }

    group.finish();
}

/// Benchmark trailer digests over a 1 MB archive
fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");

    let algorithms: [(&str, fn() -> WriteOptions); 2] = [
        ("sha1", WriteOptions::default),
        ("crc32", || WriteOptions::default().with_checksum(Crc32Checksum)),
    ];

    for (name, options) in algorithms {
        let mut writer = PboWriter::with_options(Vec::new(), options());
        writer.add_file("big.bin", vec![0xA5u8; 1024 * 1024]).unwrap();
        let data = writer.finish().unwrap();
        let checksum = options().checksum;

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("digest", name), &data, |b, data| {
            b.iter(|| black_box(checksum.digest(black_box(data))));
        });
    }

    group.bench_function("sha1_1MB_direct", |b| {
        let data = vec![0x5Au8; 1024 * 1024];
        b.iter(|| black_box(Sha1Checksum.digest(black_box(&data))));
    });

    group.finish();
}

criterion_group!(benches, bench_open, bench_build, bench_verify);
criterion_main!(benches);
