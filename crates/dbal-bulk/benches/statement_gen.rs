use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dbal_bulk::expand::{expand_rows, expand_update_bulk};
use dbal_bulk::{Dialect, MySqlDialect, Row, UpdateBulkPlan};

/// `n` rows of `id, name, qty, note`.
fn build_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            Row::new()
                .set("id", i as i64)
                .set("name", format!("user{i}"))
                .set("qty", (i % 7) as i64)
                .set("note", "bench")
        })
        .collect()
}

fn bench_insert_bulk(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_gen/insert_bulk");
    let dialect = MySqlDialect::new();

    for n in [1, 10, 100, 1000] {
        let rows = build_rows(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| {
                let sql = dialect.insert_bulk_sql("users", rows, false).unwrap();
                black_box((sql, expand_rows(rows)));
            });
        });
    }

    group.finish();
}

fn bench_update_bulk(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_gen/update_bulk");
    let dialect = MySqlDialect::new();
    let predicates = vec!["id".to_string()];

    for n in [1, 10, 100, 1000] {
        let rows = build_rows(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| {
                let plan = UpdateBulkPlan::build(rows, &predicates).unwrap();
                let sql = dialect.update_bulk_sql("users", &plan).unwrap();
                black_box((sql, expand_update_bulk(&plan)));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert_bulk, bench_update_bulk);
criterion_main!(benches);
