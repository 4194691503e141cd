//! Storage backend benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stor_bench::{generate_paths, random_data};
use stor_core::{LocalDir, MemoryStorage, Storage};
use tempfile::TempDir;

/// Benchmark MemoryStorage save operations.
fn bench_memory_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_save");

    for size in [64, 1024, 65536].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut storage = MemoryStorage::new();
            let data = random_data(size);

            b.iter(|| {
                storage.save(black_box("dir1/dir2/blob"), black_box(&data)).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark MemoryStorage load operations.
fn bench_memory_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_load");

    for size in [64, 1024, 65536].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut storage = MemoryStorage::new();
            storage.save("dir1/dir2/blob", &random_data(size)).unwrap();

            b.iter(|| {
                let result = storage.load(black_box("dir1/dir2/blob"), u64::MAX).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark MemoryStorage listing of a populated directory.
fn bench_memory_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_list");

    for count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut storage = MemoryStorage::new();
            for path in generate_paths(count, 2) {
                storage.save(&path, b"x").unwrap();
            }

            b.iter(|| {
                let listing = storage.list(black_box("dir0")).unwrap();
                black_box(listing);
            });
        });
    }

    group.finish();
}

/// Benchmark LocalDir save operations.
fn bench_local_dir_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_dir_save");

    // Every save syncs to disk
    group.sample_size(20);

    for size in [256, 4096, 65536].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let mut storage = LocalDir::open(temp_dir.path()).unwrap();
            let data = random_data(size);

            b.iter(|| {
                storage.save(black_box("dir1/blob"), black_box(&data)).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark LocalDir load operations.
fn bench_local_dir_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_dir_load");

    // Use larger sample size for file operations
    group.sample_size(50);

    for size in [256, 4096, 65536].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let mut storage = LocalDir::open(temp_dir.path()).unwrap();
            storage.save("dir1/blob", &random_data(size)).unwrap();

            b.iter(|| {
                let result = storage.load(black_box("dir1/blob"), u64::MAX).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark a save followed by a delete that prunes its directories.
fn bench_local_dir_save_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_dir_save_delete");
    group.sample_size(20);

    let temp_dir = TempDir::new().unwrap();
    let mut storage = LocalDir::open(temp_dir.path()).unwrap();
    let data = random_data(1024);

    group.bench_function("depth_3", |b| {
        b.iter(|| {
            storage.save("a/b/c/blob", &data).unwrap();
            storage.delete("a/b/c/blob").unwrap();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_memory_save,
    bench_memory_load,
    bench_memory_list,
    bench_local_dir_save,
    bench_local_dir_load,
    bench_local_dir_save_delete,
);

criterion_main!(benches);
