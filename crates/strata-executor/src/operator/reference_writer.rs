//! Reference segment output writing
//!
//! Scans and joins hand their matches to this module to turn a position
//! list into one reference segment per column of the input table.
//!
//! Reference segments always point at a Data table. When the input is
//! itself a References table, the new position list is dereferenced through
//! the input's position lists so the output references the root table
//! directly; `NULL_ROW_ID` entries pass through unchanged. When a
//! References input has no chunks there is no way to tell which table it
//! referenced, so the output references a fresh dummy table with the same
//! schema (every row of the position list is NULL anyway).

use std::sync::Arc;

use strata_storage::{
    PosList, ReferenceSegment, Segment, StorageError, Table, TableType,
};
use strata_types::{ColumnId, NULL_ROW_ID};

use crate::errors::ExecutorError;

pub(crate) fn write_reference_segments(
    segments: &mut Vec<Segment>,
    input_table: &Arc<Table>,
    pos_list: &Arc<PosList>,
) -> Result<(), ExecutorError> {
    let column_count = input_table.column_count() as ColumnId;

    if input_table.table_type() == TableType::Data {
        for column_id in 0..column_count {
            segments.push(Segment::Reference(ReferenceSegment::new(
                Arc::clone(input_table),
                column_id,
                Arc::clone(pos_list),
            )));
        }
        return Ok(());
    }

    if input_table.chunk_count() == 0 {
        let dummy_table = Table::create_dummy_table(input_table.column_definitions().to_vec());
        for column_id in 0..column_count {
            segments.push(Segment::Reference(ReferenceSegment::new(
                Arc::clone(&dummy_table),
                column_id,
                Arc::clone(pos_list),
            )));
        }
        return Ok(());
    }

    // Flatten: dereference every row through the input's position lists so
    // the output keeps a single indirection
    for column_id in 0..column_count {
        let mut flattened = PosList::with_capacity(pos_list.len());
        for row_id in pos_list.iter() {
            if row_id.is_null() {
                flattened.push(NULL_ROW_ID);
                continue;
            }
            let chunk = input_table.get_chunk(row_id.chunk_id)?;
            let reference = as_reference_segment(chunk.segment(column_id)?)?;
            flattened.push(reference.pos_list()[row_id.chunk_offset as usize]);
        }

        let first_reference =
            as_reference_segment(input_table.get_chunk(0)?.segment(column_id)?)?;
        segments.push(Segment::Reference(ReferenceSegment::new(
            Arc::clone(first_reference.referenced_table()),
            first_reference.referenced_column_id(),
            Arc::new(flattened),
        )));
    }
    Ok(())
}

fn as_reference_segment(segment: &Segment) -> Result<&ReferenceSegment, ExecutorError> {
    match segment {
        Segment::Reference(reference) => Ok(reference),
        // References tables only hold reference segments; reaching this
        // means the input violated its own invariant
        _ => Err(ExecutorError::StorageError(StorageError::SegmentKindMismatch {
            table_type: TableType::References,
        })),
    }
}
