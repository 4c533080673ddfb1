use chrono::Local;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sysmon_core::prelude::*;

fn push_sample(c: &mut Criterion) {
    let mut histories = Histories::with_capacity(3600);
    let mut sample = Sample::empty(Local::now());
    sample.cpu_percent = Some(42.0);
    sample.memory = Some(Usage::new(4, 16));
    sample.network = Some(IoRate::new(1024.0, 2048.0));
    sample.fps = Some(60.0);
    c.bench_function("push sample", |b| {
        b.iter(|| histories.push(black_box(&sample)));
    });
}

fn window_stats(c: &mut Criterion) {
    let mut history = History::new(3600);
    (0..3600).for_each(|v| history.push(v as f32));
    c.bench_function("window stats", |b| b.iter(|| black_box(&history).stats()));
}

criterion_group!(benches, push_sample, window_stats);
criterion_main!(benches);
