use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use meaning_kernel::{Dot, Euclidean};


pub fn dot_benchmark(c: &mut Criterion) {
    let dimensions = native::dimensions();
    let inputs: (Vec<i8>, Vec<i8>) = (
        native::generate_random_i8(dimensions),
        native::generate_random_i8(dimensions),
    );

    let mut group = c.benchmark_group("SIMD Dot i8");

    for i in 0..=5 {
        group.bench_with_input(BenchmarkId::new("Kernel", i), &i, |b, _| {
            b.iter(|| i8::dot(&inputs.0, &inputs.1))
        });
        group.bench_with_input(BenchmarkId::new("Rust Native", i), &i, |b, _| {
            b.iter(|| native::dot_i8_cpu(&inputs.0, &inputs.1))
        });
    }
}

pub fn euclidean_benchmark(c: &mut Criterion) {
    let dimensions = native::dimensions();
    let inputs: (Vec<i8>, Vec<i8>) = (
        native::generate_random_i8(dimensions),
        native::generate_random_i8(dimensions),
    );

    let mut group = c.benchmark_group("SIMD Euclidean i8");

    for i in 0..=5 {
        group.bench_with_input(BenchmarkId::new("Kernel", i), &i, |b, _| {
            b.iter(|| i8::euclidean(&inputs.0, &inputs.1))
        });
        group.bench_with_input(BenchmarkId::new("Rust Native", i), &i, |b, _| {
            b.iter(|| native::euclidean_i8_cpu(&inputs.0, &inputs.1))
        });
    }
}

criterion_group!(benches, dot_benchmark, euclidean_benchmark);
criterion_main!(benches);
