//! Integration tests for the column-between table scan

use std::sync::Arc;

use strata_executor::{ColumnBetweenScan, ExecutorError, Operator, TableWrapper};
use strata_storage::{
    ColumnDefinition, DictionarySegment, Segment, Table, TableType, TypedSegment, UseMvcc,
    ValueSegment,
};
use strata_types::{DataType, PredicateCondition, RowId, Value};

fn int_schema() -> Vec<ColumnDefinition> {
    vec![ColumnDefinition::new("a", DataType::Int, true)]
}

/// A single-column Data table with one value-encoded chunk per input vector.
fn value_table(chunks: Vec<Vec<Option<i32>>>) -> Arc<Table> {
    let mut table = Table::new(int_schema(), TableType::Data, 1_000, UseMvcc::No);
    for chunk in chunks {
        let segment = ValueSegment::from_nullable_values(chunk);
        table.append_chunk(vec![Segment::Int(TypedSegment::Value(segment))]).unwrap();
    }
    Arc::new(table)
}

/// Same rows, dictionary-encoded.
fn dictionary_table(chunks: Vec<Vec<Option<i32>>>) -> Arc<Table> {
    let mut table = Table::new(int_schema(), TableType::Data, 1_000, UseMvcc::No);
    for chunk in chunks {
        let values = ValueSegment::from_nullable_values(chunk);
        let segment = DictionarySegment::from_value_segment(&values);
        table.append_chunk(vec![Segment::Int(TypedSegment::Dictionary(segment))]).unwrap();
    }
    Arc::new(table)
}

fn scan(
    table: &Arc<Table>,
    lower: Value,
    upper: Value,
    condition: PredicateCondition,
) -> Result<Arc<Table>, ExecutorError> {
    let input = Arc::new(TableWrapper::new(Arc::clone(table)));
    ColumnBetweenScan::new(input, 0, lower, upper, condition).execute()
}

/// All matched row ids, concatenated across output chunks.
fn matched_rows(output: &Table) -> Vec<RowId> {
    let mut rows = Vec::new();
    for chunk_id in 0..output.chunk_count() {
        match output.get_chunk(chunk_id).unwrap().segment(0).unwrap() {
            Segment::Reference(reference) => rows.extend(reference.pos_list().iter().copied()),
            other => panic!("scan output must hold reference segments, got {:?}", other),
        }
    }
    rows
}

#[test]
fn test_scan_emits_one_reference_chunk_per_input_chunk() {
    let table = value_table(vec![vec![Some(1), Some(5)], vec![Some(9)]]);
    let output = scan(&table, Value::Int(0), Value::Int(10), PredicateCondition::BetweenInclusive)
        .unwrap();

    assert_eq!(output.table_type(), TableType::References);
    assert_eq!(output.chunk_count(), 2);
    assert_eq!(output.row_count(), 3);
    assert_eq!(output.column_definitions(), table.column_definitions());
}

#[test]
fn test_scan_between_inclusive() {
    let table = value_table(vec![vec![Some(1), Some(10), Some(15), Some(20), Some(25), None]]);
    let output =
        scan(&table, Value::Int(10), Value::Int(20), PredicateCondition::BetweenInclusive)
            .unwrap();

    assert_eq!(
        matched_rows(&output),
        vec![RowId::new(0, 1), RowId::new(0, 2), RowId::new(0, 3)]
    );
}

#[test]
fn test_scan_between_exclusive_variants() {
    let table = value_table(vec![vec![Some(10), Some(15), Some(20)]]);

    let lower_exclusive =
        scan(&table, Value::Int(10), Value::Int(20), PredicateCondition::BetweenLowerExclusive)
            .unwrap();
    assert_eq!(matched_rows(&lower_exclusive), vec![RowId::new(0, 1), RowId::new(0, 2)]);

    let upper_exclusive =
        scan(&table, Value::Int(10), Value::Int(20), PredicateCondition::BetweenUpperExclusive)
            .unwrap();
    assert_eq!(matched_rows(&upper_exclusive), vec![RowId::new(0, 0), RowId::new(0, 1)]);

    let exclusive =
        scan(&table, Value::Int(10), Value::Int(20), PredicateCondition::BetweenExclusive)
            .unwrap();
    assert_eq!(matched_rows(&exclusive), vec![RowId::new(0, 1)]);
}

#[test]
fn test_scan_null_bound_yields_empty_result() {
    let table = value_table(vec![vec![Some(1), Some(2)], vec![Some(3)]]);
    let output =
        scan(&table, Value::Null, Value::Int(10), PredicateCondition::BetweenInclusive).unwrap();

    // Still a valid References table with one chunk per input chunk
    assert_eq!(output.chunk_count(), 2);
    assert_eq!(output.row_count(), 0);
    assert!(matched_rows(&output).is_empty());
}

#[test]
fn test_scan_null_values_never_match() {
    let table = value_table(vec![vec![None, Some(5), None]]);
    let output =
        scan(&table, Value::Int(0), Value::Int(10), PredicateCondition::BetweenInclusive).unwrap();
    assert_eq!(matched_rows(&output), vec![RowId::new(0, 1)]);
}

#[test]
fn test_dictionary_scan_all_match_shortcut() {
    // Dictionary [1,2,3], codes [0,1,2,0]: bounds [0,4] cover everything
    let mut table = Table::new(int_schema(), TableType::Data, 1_000, UseMvcc::No);
    let segment = DictionarySegment::from_parts(vec![1, 2, 3], vec![0, 1, 2, 0]);
    table.append_chunk(vec![Segment::Int(TypedSegment::Dictionary(segment))]).unwrap();
    let table = Arc::new(table);

    let output =
        scan(&table, Value::Int(0), Value::Int(4), PredicateCondition::BetweenInclusive).unwrap();
    assert_eq!(
        matched_rows(&output),
        vec![RowId::new(0, 0), RowId::new(0, 1), RowId::new(0, 2), RowId::new(0, 3)]
    );
}

#[test]
fn test_dictionary_scan_empty_result() {
    let mut table = Table::new(int_schema(), TableType::Data, 1_000, UseMvcc::No);
    let segment = DictionarySegment::from_parts(vec![1, 2, 3], vec![0, 1, 2, 0]);
    table.append_chunk(vec![Segment::Int(TypedSegment::Dictionary(segment))]).unwrap();
    let table = Arc::new(table);

    let output =
        scan(&table, Value::Int(10), Value::Int(20), PredicateCondition::BetweenInclusive)
            .unwrap();
    assert_eq!(output.row_count(), 0);
}

#[test]
fn test_dictionary_scan_excludes_null_code() {
    // NULL encodes as code 3 (= |dictionary|)
    let mut table = Table::new(int_schema(), TableType::Data, 1_000, UseMvcc::No);
    let segment = DictionarySegment::from_parts(vec![1, 2, 3], vec![0, 3, 2, 3]);
    table.append_chunk(vec![Segment::Int(TypedSegment::Dictionary(segment))]).unwrap();
    let table = Arc::new(table);

    // All-match shortcut still skips NULL rows
    let all = scan(&table, Value::Int(0), Value::Int(4), PredicateCondition::BetweenInclusive)
        .unwrap();
    assert_eq!(matched_rows(&all), vec![RowId::new(0, 0), RowId::new(0, 2)]);

    // Range test excludes NULL arithmetically
    let some = scan(&table, Value::Int(2), Value::Int(3), PredicateCondition::BetweenInclusive)
        .unwrap();
    assert_eq!(matched_rows(&some), vec![RowId::new(0, 2)]);
}

#[test]
fn test_dictionary_and_generic_paths_agree() {
    let rows = vec![
        vec![Some(3), None, Some(17), Some(5), Some(5), Some(42)],
        vec![Some(-4), Some(17), None, Some(8)],
    ];
    let plain = value_table(rows.clone());
    let compressed = dictionary_table(rows);

    let cases = [
        (Value::Int(4), Value::Int(17), PredicateCondition::BetweenInclusive),
        (Value::Int(5), Value::Int(17), PredicateCondition::BetweenLowerExclusive),
        (Value::Int(5), Value::Int(17), PredicateCondition::BetweenUpperExclusive),
        (Value::Int(-10), Value::Int(100), PredicateCondition::BetweenInclusive),
        (Value::Int(100), Value::Int(200), PredicateCondition::BetweenInclusive),
        (Value::Int(5), Value::Int(5), PredicateCondition::BetweenInclusive),
        (Value::Int(5), Value::Int(5), PredicateCondition::BetweenExclusive),
    ];

    for (lower, upper, condition) in cases {
        let generic = scan(&plain, lower.clone(), upper.clone(), condition).unwrap();
        let fast = scan(&compressed, lower.clone(), upper.clone(), condition).unwrap();
        assert_eq!(
            matched_rows(&generic),
            matched_rows(&fast),
            "paths disagree for {:?} {} {:?}",
            lower,
            condition,
            upper
        );
    }
}

#[test]
fn test_scan_bounds_cast_to_column_type() {
    let table = value_table(vec![vec![Some(1), Some(2), Some(3)]]);
    // LONG bounds against an INT column
    let output =
        scan(&table, Value::Long(2), Value::Long(3), PredicateCondition::BetweenInclusive)
            .unwrap();
    assert_eq!(matched_rows(&output), vec![RowId::new(0, 1), RowId::new(0, 2)]);
}

#[test]
fn test_scan_rejects_non_between_condition() {
    let table = value_table(vec![vec![Some(1)]]);
    let result = scan(&table, Value::Int(0), Value::Int(2), PredicateCondition::Equals);
    assert!(matches!(
        result,
        Err(ExecutorError::UnreachablePredicate(PredicateCondition::Equals))
    ));
}

#[test]
fn test_scan_rejects_uncastable_bounds() {
    let table = value_table(vec![vec![Some(1)]]);
    let result = scan(
        &table,
        Value::Text("a".into()),
        Value::Text("b".into()),
        PredicateCondition::BetweenInclusive,
    );
    assert!(matches!(result, Err(ExecutorError::TypeMismatch { .. })));
}

#[test]
fn test_scan_chunk_with_position_filter_keeps_original_offsets() {
    let table = value_table(vec![vec![Some(1), Some(5), Some(9), Some(5)]]);
    let input = Arc::new(TableWrapper::new(Arc::clone(&table)));
    let scan_operator = ColumnBetweenScan::new(
        input,
        0,
        Value::Int(5),
        Value::Int(9),
        PredicateCondition::BetweenInclusive,
    );

    let filter = [3, 0, 1];
    let matches = scan_operator.scan_chunk(&table, 0, Some(&filter)).unwrap();

    // Offsets 3 and 1 match, visited in filter order
    assert_eq!(matches, vec![RowId::new(0, 3), RowId::new(0, 1)]);
}

#[test]
fn test_scan_over_scan_flattens_to_root_table() {
    let table = value_table(vec![vec![Some(1), Some(10), Some(15), Some(30)]]);

    let first = Arc::new(ColumnBetweenScan::new(
        Arc::new(TableWrapper::new(Arc::clone(&table))),
        0,
        Value::Int(5),
        Value::Int(40),
        PredicateCondition::BetweenInclusive,
    ));
    // Rows 10, 15, 30 survive the first scan
    let second = ColumnBetweenScan::new(
        Arc::clone(&first) as Arc<dyn Operator>,
        0,
        Value::Int(12),
        Value::Int(40),
        PredicateCondition::BetweenInclusive,
    );
    let output = second.execute().unwrap();

    // The second scan's output references the root Data table directly
    match output.get_chunk(0).unwrap().segment(0).unwrap() {
        Segment::Reference(reference) => {
            assert!(Arc::ptr_eq(reference.referenced_table(), &table));
        }
        other => panic!("expected a reference segment, got {:?}", other),
    }
    assert_eq!(matched_rows(&output), vec![RowId::new(0, 2), RowId::new(0, 3)]);
}

#[test]
fn test_scan_output_shares_one_pos_list_per_chunk() {
    let mut table = Table::new(
        vec![
            ColumnDefinition::new("a", DataType::Int, false),
            ColumnDefinition::new("b", DataType::Int, false),
        ],
        TableType::Data,
        1_000,
        UseMvcc::No,
    );
    table
        .append_chunk(vec![
            Segment::Int(TypedSegment::Value(ValueSegment::from_values(vec![1, 2]))),
            Segment::Int(TypedSegment::Value(ValueSegment::from_values(vec![10, 20]))),
        ])
        .unwrap();
    let table = Arc::new(table);

    let output =
        scan(&table, Value::Int(0), Value::Int(5), PredicateCondition::BetweenInclusive).unwrap();

    let chunk = output.get_chunk(0).unwrap();
    let (Segment::Reference(first), Segment::Reference(second)) =
        (chunk.segment(0).unwrap(), chunk.segment(1).unwrap())
    else {
        panic!("scan output must hold reference segments");
    };
    assert!(Arc::ptr_eq(first.pos_list(), second.pos_list()));
}

#[test]
fn test_scan_deep_copy_preserves_parameters() {
    let table = value_table(vec![vec![Some(1), Some(7)]]);
    let original = ColumnBetweenScan::new(
        Arc::new(TableWrapper::new(Arc::clone(&table))),
        0,
        Value::Int(5),
        Value::Int(9),
        PredicateCondition::BetweenInclusive,
    );
    let copy = original.deep_copy();

    assert_eq!(copy.name(), "ColumnBetweenScan");
    assert_eq!(matched_rows(&copy.execute().unwrap()), matched_rows(&original.execute().unwrap()));
}
