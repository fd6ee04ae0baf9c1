// Criterion benchmarks for the Amora API

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use amora_api::core::exclusion::ExclusionSet;
use amora_api::core::quota::swipe_allowed;

fn encoded_set(entries: usize) -> String {
    (0..entries)
        .map(|n| format!("user-{:06}", n))
        .collect::<Vec<_>>()
        .join(",")
}

fn bench_exclusion_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("exclusion_parse");
    for size in [10usize, 100, 1000] {
        let encoded = encoded_set(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| ExclusionSet::parse(black_box(encoded)));
        });
    }
    group.finish();
}

fn bench_exclusion_append(c: &mut Criterion) {
    let encoded = encoded_set(100);
    c.bench_function("exclusion_append_roundtrip", |b| {
        b.iter(|| {
            let mut set = ExclusionSet::parse(black_box(&encoded));
            set.insert(black_box("user-next"));
            set.encode()
        });
    });
}

fn bench_membership_check(c: &mut Criterion) {
    let set = ExclusionSet::parse(&encoded_set(1000));
    c.bench_function("exclusion_membership_miss", |b| {
        b.iter(|| set.contains(black_box("user-absent")));
    });
}

fn bench_quota(c: &mut Criterion) {
    c.bench_function("quota_check", |b| {
        b.iter(|| swipe_allowed(black_box(9), black_box(false)));
    });
}

criterion_group!(
    benches,
    bench_exclusion_parse,
    bench_exclusion_append,
    bench_membership_check,
    bench_quota
);
criterion_main!(benches);
