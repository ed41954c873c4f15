//! Integration tests for Table chunking and schema enforcement

use std::sync::Arc;

use strata_storage::{
    ColumnDefinition, DictionarySegment, ReferenceSegment, Segment, StorageError, Table,
    TableType, TypedSegment, UseMvcc, ValueSegment,
};
use strata_types::{DataType, RowId, Value};

fn test_schema() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("id", DataType::Int, false),
        ColumnDefinition::new("name", DataType::Text, true),
    ]
}

#[test]
fn test_append_fills_chunks_to_max_size() {
    let mut table = Table::new(test_schema(), TableType::Data, 3, UseMvcc::No);

    for i in 0..7 {
        table.append(vec![Value::Int(i), Value::Text(format!("row {}", i))]).unwrap();
    }

    // 3 + 3 + 1: every chunk but the last is exactly max_chunk_size
    assert_eq!(table.chunk_count(), 3);
    assert_eq!(table.get_chunk(0).unwrap().size(), 3);
    assert_eq!(table.get_chunk(1).unwrap().size(), 3);
    assert_eq!(table.get_chunk(2).unwrap().size(), 1);
    assert_eq!(table.row_count(), 7);
    assert!(!table.empty());
}

#[test]
fn test_append_validates_arity() {
    let mut table = Table::new(test_schema(), TableType::Data, 3, UseMvcc::No);
    assert_eq!(
        table.append(vec![Value::Int(1)]),
        Err(StorageError::ColumnCountMismatch { expected: 2, actual: 1 })
    );
}

#[test]
fn test_append_validates_types() {
    let mut table = Table::new(test_schema(), TableType::Data, 3, UseMvcc::No);
    let result = table.append(vec![Value::Text("1".into()), Value::Null]);
    assert_eq!(
        result,
        Err(StorageError::TypeMismatch {
            column: "id".into(),
            expected: DataType::Int,
            actual: DataType::Text,
        })
    );
}

#[test]
fn test_append_validates_nullability() {
    let mut table = Table::new(test_schema(), TableType::Data, 3, UseMvcc::No);
    assert_eq!(
        table.append(vec![Value::Null, Value::Null]),
        Err(StorageError::NullConstraintViolation { column: "id".into() })
    );
    // The nullable column accepts NULL
    table.append(vec![Value::Int(1), Value::Null]).unwrap();
}

#[test]
fn test_column_accessors() {
    let table = Table::new(test_schema(), TableType::Data, 3, UseMvcc::No);

    assert_eq!(table.column_count(), 2);
    assert_eq!(table.column_name(1).unwrap(), "name");
    assert_eq!(table.column_names(), vec!["id", "name"]);
    assert_eq!(table.column_data_type(0).unwrap(), DataType::Int);
    assert_eq!(table.column_data_types(), vec![DataType::Int, DataType::Text]);
    assert!(!table.column_is_nullable(0).unwrap());
    assert_eq!(table.columns_are_nullable(), vec![false, true]);
    assert_eq!(table.column_id_by_name("name").unwrap(), 1);
    assert!(matches!(
        table.column_id_by_name("missing"),
        Err(StorageError::ColumnNotFound { .. })
    ));
    assert!(matches!(
        table.column_data_type(9),
        Err(StorageError::ColumnIndexOutOfBounds { index: 9 })
    ));
}

#[test]
fn test_mvcc_slots_follow_chunk_sizes() {
    let mut table = Table::new(test_schema(), TableType::Data, 2, UseMvcc::Yes);
    for i in 0..3 {
        table.append(vec![Value::Int(i), Value::Null]).unwrap();
    }

    assert!(table.has_mvcc());
    assert_eq!(table.get_chunk(0).unwrap().mvcc_data().unwrap().size(), 2);
    assert_eq!(table.get_chunk(1).unwrap().mvcc_data().unwrap().size(), 1);
}

#[test]
fn test_data_table_rejects_reference_segments() {
    let mut data = Table::new(
        vec![ColumnDefinition::new("id", DataType::Int, false)],
        TableType::Data,
        4,
        UseMvcc::No,
    );
    data.append(vec![Value::Int(1)]).unwrap();
    let data = Arc::new(data);

    let pos_list = Arc::new(vec![RowId::new(0, 0)]);
    let reference = Segment::Reference(ReferenceSegment::new(Arc::clone(&data), 0, pos_list));

    let mut target = Table::new(
        vec![ColumnDefinition::new("id", DataType::Int, false)],
        TableType::Data,
        4,
        UseMvcc::No,
    );
    assert_eq!(
        target.append_chunk(vec![reference]),
        Err(StorageError::SegmentKindMismatch { table_type: TableType::Data })
    );
}

#[test]
fn test_references_table_rejects_value_segments() {
    let mut table = Table::new(
        vec![ColumnDefinition::new("id", DataType::Int, false)],
        TableType::References,
        4,
        UseMvcc::No,
    );
    let value = Segment::Int(TypedSegment::Value(ValueSegment::from_values(vec![1])));
    assert_eq!(
        table.append_chunk(vec![value]),
        Err(StorageError::SegmentKindMismatch { table_type: TableType::References })
    );
}

#[test]
fn test_append_chunk_validates_segment_sizes() {
    let mut table = Table::new(test_schema(), TableType::Data, 4, UseMvcc::No);
    let ids = Segment::Int(TypedSegment::Value(ValueSegment::from_values(vec![1, 2])));
    let names = Segment::Text(TypedSegment::Value(ValueSegment::from_nullable_values(vec![
        Some("a".to_string()),
    ])));
    assert_eq!(
        table.append_chunk(vec![ids, names]),
        Err(StorageError::ChunkSizeMismatch { expected: 2, actual: 1 })
    );
}

#[test]
fn test_append_chunk_accepts_dictionary_segments() {
    let mut table = Table::new(
        vec![ColumnDefinition::new("id", DataType::Int, false)],
        TableType::Data,
        4,
        UseMvcc::No,
    );
    let dictionary =
        Segment::Int(TypedSegment::Dictionary(DictionarySegment::from_parts(vec![1, 2], vec![
            0, 1, 0,
        ])));
    table.append_chunk(vec![dictionary]).unwrap();

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.get_chunk(0).unwrap().segment(0).unwrap().value_at(2), Some(Value::Int(1)));
}

#[test]
fn test_append_mutex_serializes_appenders() {
    let table = Table::new(test_schema(), TableType::Data, 3, UseMvcc::No);
    let guard = table.acquire_append_mutex();
    drop(guard);
}

#[test]
fn test_reference_segment_dereferences() {
    let mut data = Table::new(test_schema(), TableType::Data, 2, UseMvcc::No);
    for i in 0..4 {
        data.append(vec![Value::Int(i), Value::Text(format!("row {}", i))]).unwrap();
    }
    let data = Arc::new(data);

    // Rows 3 and 0, plus a NULL padding entry
    let pos_list = Arc::new(vec![
        RowId::new(1, 1),
        RowId::new(0, 0),
        strata_types::NULL_ROW_ID,
    ]);
    let reference = ReferenceSegment::new(Arc::clone(&data), 1, pos_list);

    assert_eq!(reference.size(), 3);
    assert_eq!(reference.data_type(), DataType::Text);
    assert_eq!(reference.value_at(0), Some(Value::Text("row 3".into())));
    assert_eq!(reference.value_at(1), Some(Value::Text("row 0".into())));
    assert_eq!(reference.value_at(2), None);

    let positions: Vec<_> = reference.positions(None).collect();
    assert_eq!(positions[0].value, Some(Value::Text("row 3".into())));
    assert!(positions[2].is_null());
}

#[test]
fn test_estimate_memory_usage_grows_with_rows() {
    let mut table = Table::new(test_schema(), TableType::Data, 100, UseMvcc::No);
    let before = table.estimate_memory_usage();
    for i in 0..50 {
        table.append(vec![Value::Int(i), Value::Text("payload".into())]).unwrap();
    }
    assert!(table.estimate_memory_usage() > before);
}
