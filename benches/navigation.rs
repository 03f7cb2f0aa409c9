//! Benchmarks for page turns across chapter boundaries.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use folio::pager::{Cursor, Direction, PageViewController};
use folio::store::MemoryStore;

fn bench_read_through(c: &mut Criterion) {
    let counts = vec![40; 50];
    c.bench_function("read_through_50_chapters", |b| {
        b.iter(|| {
            let store = MemoryStore::with_page_counts(black_box(&counts));
            let mut controller = PageViewController::new(store, Cursor::default());
            while controller.fill_page(Direction::Next).moved() {}
            controller.cursor()
        })
    });
}

fn bench_turn_back_and_forth(c: &mut Criterion) {
    let store = MemoryStore::with_page_counts(&[3, 3, 3]);
    let mut controller = PageViewController::new(store, Cursor::new(1, 0));
    c.bench_function("turn_across_boundary", |b| {
        b.iter(|| {
            controller.fill_page(black_box(Direction::Prev));
            controller.fill_page(black_box(Direction::Next));
        })
    });
}

criterion_group!(benches, bench_read_through, bench_turn_back_and_forth);
criterion_main!(benches);
