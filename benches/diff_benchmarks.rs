//! Dirty-check benchmarks
//!
//! `has_unsaved_changes` runs on every cancel and typically on every UI
//! render, so the snapshot diff has to stay cheap for large experiments.
//!
//! Run with: cargo bench --bench diff_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use track_editor::experiment::{AssignmentMode, Experiment, ExperimentDraft, Track, TrackId};
use track_editor::session::has_differences;

const SMALL_SIZE: u64 = 10;
const LARGE_SIZE: u64 = 10_000;

fn snapshot(tracks: u64) -> Experiment {
    Experiment::builder("Bench")
        .mode(AssignmentMode::Weighted)
        .tracks((1..=tracks).map(|i| {
            Track::persisted(TrackId::new(i), format!("Track {i}")).with_weighting(1)
        }))
        .build()
}

/// Benchmark the full scan (clean draft, no early exit)
fn bench_clean_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_clean");

    for size in [SMALL_SIZE, LARGE_SIZE] {
        let original = snapshot(size);
        let current = original.clone();
        group.bench_with_input(BenchmarkId::new("has_differences", size), &size, |b, _| {
            b.iter(|| has_differences(black_box(&original), black_box(&current)));
        });
    }

    group.finish();
}

/// Benchmark weight validation over the draft
fn bench_weight_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("weight_sum");

    let draft = ExperimentDraft::new(snapshot(LARGE_SIZE));
    group.bench_function(BenchmarkId::new("is_balanced", LARGE_SIZE), |b| {
        b.iter(|| black_box(&draft).is_balanced());
    });

    group.finish();
}

criterion_group!(benches, bench_clean_diff, bench_weight_sum);
criterion_main!(benches);
