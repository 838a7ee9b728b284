use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use delta_core::{ChangeSide, DiffConfig, DiffProvider, FileDiffModel, SimilarDiffProvider};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog (delta-core benchmark line)\n"
        ));
    }
    out
}

/// Every `every`-th line rewritten.
fn edited_text(line_count: usize, every: usize) -> String {
    large_text(line_count)
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i % every == 0 {
                format!("{i:06} a changed line\n")
            } else {
                format!("{line}\n")
            }
        })
        .collect()
}

fn bench_build_model(c: &mut Criterion) {
    let old = large_text(20_000);
    let new = edited_text(20_000, 50);
    let provider = SimilarDiffProvider::default();
    let script = provider.edit_script(&old, &new);

    c.bench_function("build_model/20k_lines_400_deltas", |b| {
        b.iter(|| {
            let model = FileDiffModel::new(black_box(&old), black_box(&new), &script).unwrap();
            black_box(model.deltas().len());
        })
    });
}

fn bench_accept_all(c: &mut Criterion) {
    let old = large_text(20_000);
    let new = edited_text(20_000, 50);
    let script = SimilarDiffProvider::default().edit_script(&old, &new);

    c.bench_function("accept_all/400_deltas", |b| {
        b.iter_batched(
            || FileDiffModel::new(&old, &new, &script).unwrap(),
            |mut model| {
                for index in 0..model.deltas().len() {
                    model.accept_at(index).unwrap();
                }
                black_box(model.side_text(ChangeSide::Old).len_chars());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    let old = large_text(20_000);
    let new = edited_text(20_000, 50);
    let script = SimilarDiffProvider::default().edit_script(&old, &new);

    c.bench_function("typing_middle/100_inserts", |b| {
        b.iter_batched(
            || FileDiffModel::new(&old, &new, &script).unwrap(),
            |mut model| {
                let mut offset = model.side_text(ChangeSide::New).len_chars() / 2;
                for _ in 0..100 {
                    model.process_text_event(offset, 0, "x").unwrap();
                    offset += 1;
                }
                black_box(model.deltas().len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_line_parts(c: &mut Criterion) {
    let old = large_text(2_000);
    let new = edited_text(2_000, 10);

    c.bench_function("line_parts/200_deltas", |b| {
        b.iter_batched(
            || {
                FileDiffModel::from_provider(
                    &old,
                    &new,
                    &SimilarDiffProvider::default(),
                    DiffConfig::default(),
                )
                .unwrap()
            },
            |model| {
                for index in 0..model.deltas().len() {
                    black_box(model.line_part_changes(index).unwrap());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_build_model,
    bench_accept_all,
    bench_typing_in_middle,
    bench_line_parts
);
criterion_main!(benches);
