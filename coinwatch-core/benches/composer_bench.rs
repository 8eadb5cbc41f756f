//! Criterion benchmarks for the form hot paths.
//!
//! Benchmarks:
//! 1. Job materialization from a full draft
//! 2. Keypad dispatch through the focus router into the composer

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use coinwatch_core::domain::{Coin, TickTrigger};
use coinwatch_core::{
    AlertSession, ComposerConfig, DraftField, DraftPatch, FocusRouter, JobComposer,
    RecordingSubmitter,
};

fn coin() -> Coin {
    Coin::new(TickTrigger::new("binance", "BTC", "USDT"))
}

fn bench_build_job(c: &mut Criterion) {
    let mut composer = JobComposer::new();
    composer.update(
        DraftPatch::field(DraftField::LowPrice, "26000.5")
            .set(DraftField::HighPrice, "31000")
            .set(DraftField::Message, "breakout watch"),
    );
    let coin = coin();

    c.bench_function("build_job_both_branches", |b| {
        b.iter(|| black_box(composer.build_job(black_box(&coin))))
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let session = AlertSession::new(
        coin(),
        Arc::new(FocusRouter::new()),
        RecordingSubmitter::new(),
        ComposerConfig::default(),
    );
    session.on_focus(DraftField::LowPrice);
    let router = session.router();

    c.bench_function("router_dispatch_to_composer", |b| {
        b.iter(|| router.dispatch(black_box("27123.45".to_string())))
    });
}

criterion_group!(benches, bench_build_job, bench_dispatch);
criterion_main!(benches);
