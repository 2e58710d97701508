//! Benchmarks for tinytable row operations

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::TempDir;
use tinytable::{
    ColumnDescriptor, Condition, Config, Row, RowStore, Schema, SyncStrategy, Table, TableKind,
};

fn schema_for(kind: TableKind) -> Schema {
    let text = match kind {
        TableKind::Static => ColumnDescriptor::string("text", 64),
        TableKind::Dynamic => ColumnDescriptor::flexible_string("text"),
    };
    Schema::new(vec![
        ColumnDescriptor::int64("id"),
        ColumnDescriptor::float64("score"),
        text,
        ColumnDescriptor::timestamp("created"),
    ])
    .unwrap()
}

fn sample_row(id: i64) -> Row {
    Row::new()
        .with("id", id)
        .with("score", id as f64 * 0.25)
        .with("text", format!("row number {}", id))
        .with("created", chrono::Utc::now())
}

fn setup_table(kind: TableKind, rows: i64) -> (TempDir, Table) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::DataOnly)
        .build();
    let mut table = Table::create(&config, "bench", kind, schema_for(kind)).unwrap();
    for id in 0..rows {
        table.insert(&sample_row(id)).unwrap();
    }
    (temp_dir, table)
}

fn table_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("table");
    group.sample_size(20);

    for kind in [TableKind::Static, TableKind::Dynamic] {
        let (_append_dir, mut table) = setup_table(kind, 0);
        let mut id = 0;
        group.bench_function(BenchmarkId::new("append", kind), |b| {
            b.iter(|| {
                table.insert(&sample_row(id)).unwrap();
                id += 1;
            });
        });

        let (_read_dir, mut table) = setup_table(kind, 256);
        let mut n = 0;
        group.bench_function(BenchmarkId::new("read", kind), |b| {
            b.iter(|| {
                table.read_row(n % 256).unwrap();
                n += 1;
            });
        });

        let (_scan_dir, mut table) = setup_table(kind, 1000);
        let conditions = [Condition::ge("id", 500)];
        group.bench_function(BenchmarkId::new("scan_1000", kind), |b| {
            b.iter(|| table.scan(&conditions).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, table_benchmarks);
criterion_main!(benches);
