use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use casefile_core::config::DialogueConfig;
use casefile_core::{DialogueBox, SceneState};

fn make_boxes(lines: usize) -> Vec<DialogueBox> {
    let config = DialogueConfig { ms_per_char: 20, ..DialogueConfig::default() };
    (0..lines)
        .map(|i| {
            let raw = match i % 4 {
                0 => format!("[EMOTION=normal]Line {i}, told plainly."),
                1 => format!("Well[PAUSE=120]... (line {i})[SOUND=blip] sure."),
                2 => format!("[SPEED=5]Fast talker {i}[MOUTH_OPEN] yes[MOUTH_CLOSE]."),
                3 => format!("[EMPHASIS]Objection![/EMPHASIS][SHAKE][OPPONENT_DAMAGED] {i}"),
                _ => unreachable!(),
            };
            DialogueBox::from_markup(&raw, &config).unwrap()
        })
        .collect()
}

fn bench_dialogue(c: &mut Criterion) {
    const LINES: usize = 1_000;
    let mut group = c.benchmark_group("dialogue");
    group.sample_size(10);

    group.bench_function("reveal 1k lines at 60fps", |b| {
        b.iter_batched(
            || make_boxes(LINES),
            |mut boxes| {
                let mut state = SceneState::new();
                for dlg in &mut boxes {
                    dlg.begin(&mut state);
                    while !dlg.is_finished() {
                        dlg.update(16, &mut state);
                    }
                    state.drain();
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("skip 1k lines", |b| {
        b.iter_batched(
            || make_boxes(LINES),
            |mut boxes| {
                let mut state = SceneState::new();
                for dlg in &mut boxes {
                    dlg.begin(&mut state);
                    dlg.skip(&mut state);
                }
                state.drain()
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_dialogue);
criterion_main!(benches);
