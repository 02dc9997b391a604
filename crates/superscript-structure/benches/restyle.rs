use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use superscript_core::{Document, DocumentStateManager, SelectionRange};
use superscript_structure::{autocomplete, build_structure, restyle};

fn large_script(page_count: usize) -> String {
    let mut out = String::with_capacity(page_count * 400);
    out.push_str("Benchmark Script\nwriter: Someone\ncharacters: Alice, Bob, Carol\n\n");
    for page in 0..page_count {
        out.push_str("PAGE\n");
        for _ in 0..4 {
            out.push_str("Panel\nA wide shot of the harbor at dusk.\n");
            out.push_str("ALICE:\n  We should not be here.\n");
            out.push_str("BOB: (O.S.)\n  Too late for that now, keep moving.\n");
            out.push_str(":\n  Fine.\n");
        }
        if page % 25 == 24 {
            out.push_str("Notes\nSomething to revisit.\n");
        }
    }
    out
}

fn bench_first_pass(c: &mut Criterion) {
    let document = Document::from_text(&large_script(500));
    c.bench_function("build_structure/500_pages_unstyled", |b| {
        b.iter(|| black_box(build_structure(black_box(&document)).patch.len()))
    });
}

fn bench_settled_pass(c: &mut Criterion) {
    let mut state = DocumentStateManager::new(&large_script(500));
    restyle(&mut state).unwrap();
    let document = state.document().clone();
    c.bench_function("build_structure/500_pages_settled", |b| {
        b.iter(|| black_box(build_structure(black_box(&document)).patch.is_noop()))
    });
}

fn bench_restyle_apply(c: &mut Criterion) {
    let text = large_script(200);
    c.bench_function("restyle/200_pages_apply", |b| {
        b.iter_batched(
            || DocumentStateManager::new(&text),
            |mut state| black_box(restyle(&mut state).unwrap().applied),
            BatchSize::LargeInput,
        )
    });
}

fn bench_autocomplete(c: &mut Criterion) {
    let mut state = DocumentStateManager::new(&(large_script(500) + "Al\n"));
    restyle(&mut state).unwrap();
    let caret = state.document().char_count() - 1;
    c.bench_function("autocomplete/end_of_500_pages", |b| {
        b.iter(|| {
            let suggestions = autocomplete(state.document(), Some(SelectionRange::caret(caret)), 2);
            black_box(suggestions.items.len())
        })
    });
}

criterion_group!(
    benches,
    bench_first_pass,
    bench_settled_pass,
    bench_restyle_apply,
    bench_autocomplete
);
criterion_main!(benches);
