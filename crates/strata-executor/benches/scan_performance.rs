/// Scan path benchmarks
///
/// Compares the dictionary value-id fast path against the generic typed
/// path on the same data, across selectivities.
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_executor::{ColumnBetweenScan, Operator, TableWrapper};
use strata_storage::{
    ColumnDefinition, DictionarySegment, Segment, Table, TableType, TypedSegment, UseMvcc,
    ValueSegment,
};
use strata_types::{DataType, PredicateCondition, Value};

const ROWS_PER_CHUNK: usize = 10_000;
const CHUNKS: usize = 10;

fn chunk_values(chunk_index: usize) -> Vec<i32> {
    // Deterministic spread over 0..1000
    (0..ROWS_PER_CHUNK).map(|row| ((row * 37 + chunk_index * 11) % 1_000) as i32).collect()
}

fn value_encoded_table() -> Arc<Table> {
    let mut table = Table::new(
        vec![ColumnDefinition::new("a", DataType::Int, false)],
        TableType::Data,
        ROWS_PER_CHUNK as u32,
        UseMvcc::No,
    );
    for chunk_index in 0..CHUNKS {
        let segment = ValueSegment::from_values(chunk_values(chunk_index));
        table.append_chunk(vec![Segment::Int(TypedSegment::Value(segment))]).unwrap();
    }
    Arc::new(table)
}

fn dictionary_encoded_table() -> Arc<Table> {
    let mut table = Table::new(
        vec![ColumnDefinition::new("a", DataType::Int, false)],
        TableType::Data,
        ROWS_PER_CHUNK as u32,
        UseMvcc::No,
    );
    for chunk_index in 0..CHUNKS {
        let values = ValueSegment::from_values(chunk_values(chunk_index));
        let segment = DictionarySegment::from_value_segment(&values);
        table.append_chunk(vec![Segment::Int(TypedSegment::Dictionary(segment))]).unwrap();
    }
    Arc::new(table)
}

fn scan_row_count(table: &Arc<Table>, upper: i32) -> u64 {
    let scan = ColumnBetweenScan::new(
        Arc::new(TableWrapper::new(Arc::clone(table))),
        0,
        Value::Int(0),
        Value::Int(upper),
        PredicateCondition::BetweenInclusive,
    );
    scan.execute().unwrap().row_count()
}

fn bench_scan_paths(c: &mut Criterion) {
    let plain = value_encoded_table();
    let compressed = dictionary_encoded_table();

    let mut group = c.benchmark_group("column_between_scan");
    for upper in [10, 500, 999] {
        group.bench_with_input(BenchmarkId::new("generic", upper), &upper, |b, &upper| {
            b.iter(|| black_box(scan_row_count(&plain, upper)))
        });
        group.bench_with_input(BenchmarkId::new("dictionary", upper), &upper, |b, &upper| {
            b.iter(|| black_box(scan_row_count(&compressed, upper)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scan_paths);
criterion_main!(benches);
