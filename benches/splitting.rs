//! Benchmarks for splitting chapter text into pages.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use folio::pagination::{LayoutConstraints, split};

fn chapter_text(paragraphs: usize) -> String {
    let paragraph = "It was the best of times, it was the worst of times, it was the age of \
                     wisdom, it was the age of foolishness, it was the epoch of belief.\n\n";
    paragraph.repeat(paragraphs)
}

fn bench_split_short_chapter(c: &mut Criterion) {
    let text = chapter_text(20);
    let layout = LayoutConstraints::new(80, 24).with_margins(2, 0);
    c.bench_function("split_short_chapter", |b| {
        b.iter(|| split(0, black_box(&text), black_box(&layout)))
    });
}

fn bench_split_long_chapter(c: &mut Criterion) {
    let text = chapter_text(2_000);
    let layout = LayoutConstraints::new(80, 24).with_margins(2, 0);
    c.bench_function("split_long_chapter", |b| {
        b.iter(|| split(0, black_box(&text), black_box(&layout)))
    });
}

fn bench_split_wide_glyphs(c: &mut Criterion) {
    let text = "第一章 风起云涌，天下大势，分久必合，合久必分。\n".repeat(500);
    let layout = LayoutConstraints::new(60, 30);
    c.bench_function("split_wide_glyphs", |b| {
        b.iter(|| split(0, black_box(&text), black_box(&layout)))
    });
}

criterion_group!(
    benches,
    bench_split_short_chapter,
    bench_split_long_chapter,
    bench_split_wide_glyphs
);
criterion_main!(benches);
