use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tabledit::*;

fn filled_table(rows: usize) -> Table {
    let mut table = Table::new();
    table.add_cols(&["id", "name", "qty"]);
    table.add_rows(rows);
    let values: Vec<String> = (0..rows).map(|i| i.to_string()).collect();
    let items: Vec<(i64, &str, &str)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as i64, "id", v.as_str()))
        .collect();
    table.set_cells(&items).unwrap();
    table.clear_history();
    table
}

fn bench_interner(c: &mut Criterion) {
    let mut group = c.benchmark_group("interner_intern");

    for size in [100, 1000, 10000].iter() {
        let words: Vec<String> = (0..*size).map(|i| format!("value-{}", i % 100)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut interner = StringInterner::new();
                for word in &words {
                    black_box(interner.intern(word));
                }
            });
        });
    }
    group.finish();
}

fn bench_set_cells(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_set_cells");

    for size in [100, 1000, 10000].iter() {
        let values: Vec<String> = (0..*size).map(|i| format!("n{}", i)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_with_setup(
                || filled_table(size),
                |mut table| {
                    let items: Vec<(i64, &str, &str)> = values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| (i as i64, "name", v.as_str()))
                        .collect();
                    table.set_cells(black_box(&items)).unwrap();
                },
            );
        });
    }
    group.finish();
}

fn bench_random_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_random_access");

    for size in [100, 1000, 10000].iter() {
        let table = filled_table(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let row = black_box((size / 2) as i64);
                table.get(row, "id").unwrap().len()
            });
        });
    }
    group.finish();
}

fn bench_delete_rows_and_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_delete_rows_undo");

    for size in [100, 1000, 5000].iter() {
        let indices: Vec<i64> = (0..*size as i64).step_by(2).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_with_setup(
                || filled_table(size),
                |mut table| {
                    table.delete_rows(black_box(&indices)).unwrap();
                    table.undo();
                },
            );
        });
    }
    group.finish();
}

fn bench_move_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_move_row");

    for size in [100, 1000, 10000].iter() {
        let mut table = filled_table(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                table.move_row(black_box(0), black_box(-1)).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_interner,
    bench_set_cells,
    bench_random_access,
    bench_delete_rows_and_undo,
    bench_move_row
);
criterion_main!(benches);
