//! Criterion benchmarks for row copies through the vector load/store paths.
//!
//! Run with: cargo bench --bench memory_benchmark

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use zenvec::{PixelRow, memory, overread};

const WIDTHS: &[usize] = &[64, 517, 1920];

fn bench_copy_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_row");

    for &width in WIDTHS {
        let padded = width.next_multiple_of(16) + 16;
        let src: Vec<u8> = (0..padded).map(|i| (i * 13) as u8).collect();
        let mut dst = vec![0u8; padded];
        group.throughput(Throughput::Bytes(width as u64));

        group.bench_function(BenchmarkId::new("unaligned16", width), |b| {
            b.iter(|| {
                for (s, d) in src.chunks_exact(16).zip(dst.chunks_exact_mut(16)) {
                    let v = memory::load_unaligned16(s.try_into().unwrap());
                    memory::store_unaligned16(d.try_into().unwrap(), v);
                }
                black_box(&dst);
            })
        });

        group.bench_function(BenchmarkId::new("halves8", width), |b| {
            b.iter(|| {
                for (s, d) in src.chunks_exact(16).zip(dst.chunks_exact_mut(16)) {
                    let lo = memory::load_lo8(s[..8].try_into().unwrap());
                    let v = memory::load_hi8(lo, s[8..].try_into().unwrap());
                    memory::store_lo8((&mut d[..8]).try_into().unwrap(), v);
                    memory::store_hi8((&mut d[8..]).try_into().unwrap(), v);
                }
                black_box(&dst);
            })
        });

        let row = PixelRow::new(&src, width).unwrap();
        group.bench_function(BenchmarkId::new("row_msan16", width), |b| {
            b.iter(|| {
                for (x, d) in (0..width).step_by(16).zip(dst.chunks_exact_mut(16)) {
                    let v = row.load_unaligned16_msan(black_box(x)).unwrap();
                    memory::store_unaligned16(d.try_into().unwrap(), v);
                }
                black_box(&dst);
            })
        });

        group.bench_function(BenchmarkId::new("mask_overreads", width), |b| {
            b.iter(|| {
                for x in (0..width).step_by(16) {
                    let w = row.window::<16>(x).unwrap();
                    black_box(overread::load_unaligned16_msan(w, row.overread_extent(x, 16)));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_copy_row);
criterion_main!(benches);
