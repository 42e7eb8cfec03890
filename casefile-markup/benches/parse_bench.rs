use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use casefile_markup::parse;

fn make_dialogue(lines: usize) -> Vec<String> {
    (0..lines)
        .map(|i| match i % 5 {
            0 => format!("[EMOTION=normal]Line {i}, nothing special."),
            1 => format!("Wait[PAUSE=300]... line {i}[SOUND=blip]!"),
            2 => format!("[SPEED=60]Slowly (thinking about {i}) now."),
            3 => format!("[EMPHASIS]Hold it![/EMPHASIS][SCREEN_SHAKE=1.5] {i}"),
            4 => format!("[BGM=trial_{i},permanent][ZOOM]Take that![END_ZOOM]"),
            _ => unreachable!(),
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let lines = make_dialogue(10_000);
    let mut group = c.benchmark_group("markup");
    group.sample_size(10);
    group.bench_function("parse 10k lines", |b| {
        b.iter(|| {
            for line in &lines {
                let _parsed = parse(black_box(line)).unwrap();
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
