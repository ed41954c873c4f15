//! Reference segments
//!
//! A reference segment stores no data of its own: it points into another
//! table's segments through a shared position list. All reference segments
//! of one output chunk usually share the same list, so a scan or join pays
//! one position list for the whole row, not one per column.
//!
//! The referenced table is always a Data table. Operators that would emit a
//! reference to a References table flatten through its position lists first,
//! so at most one indirection ever exists.

use std::sync::Arc;

use strata_types::{ChunkOffset, ColumnId, DataType, Value};

use crate::pos_list::PosList;
use crate::segment::iterate::{offset_cursor, SegmentPosition};
use crate::table::{Table, TableType};

#[derive(Debug, Clone)]
pub struct ReferenceSegment {
    referenced_table: Arc<Table>,
    referenced_column_id: ColumnId,
    pos_list: Arc<PosList>,
}

impl ReferenceSegment {
    pub fn new(
        referenced_table: Arc<Table>,
        referenced_column_id: ColumnId,
        pos_list: Arc<PosList>,
    ) -> Self {
        debug_assert_eq!(
            referenced_table.table_type(),
            TableType::Data,
            "reference segments must point at a Data table"
        );
        debug_assert!((referenced_column_id as usize) < referenced_table.column_count());
        ReferenceSegment { referenced_table, referenced_column_id, pos_list }
    }

    pub fn size(&self) -> ChunkOffset {
        self.pos_list.len() as ChunkOffset
    }

    pub fn data_type(&self) -> DataType {
        // The column id was validated at construction
        self.referenced_table
            .column_data_type(self.referenced_column_id)
            .unwrap_or(DataType::Int)
    }

    pub fn referenced_table(&self) -> &Arc<Table> {
        &self.referenced_table
    }

    pub fn referenced_column_id(&self) -> ColumnId {
        self.referenced_column_id
    }

    pub fn pos_list(&self) -> &Arc<PosList> {
        &self.pos_list
    }

    /// Dereference one position. `None` for a NULL row id (outer-join
    /// padding) and for NULL values in the referenced segment.
    pub fn value_at(&self, chunk_offset: ChunkOffset) -> Option<Value> {
        let row_id = self.pos_list[chunk_offset as usize];
        if row_id.is_null() {
            return None;
        }
        let chunk = self.referenced_table.get_chunk(row_id.chunk_id).ok()?;
        let segment = chunk.segment(self.referenced_column_id).ok()?;
        segment.value_at(row_id.chunk_offset)
    }

    /// Iterate positions, dereferencing through the referenced table. The
    /// chunk offsets are offsets within this segment, not the target.
    pub fn positions<'a>(
        &'a self,
        position_filter: Option<&'a [ChunkOffset]>,
    ) -> impl Iterator<Item = SegmentPosition<Value>> + 'a {
        offset_cursor(self.size(), position_filter)
            .map(move |chunk_offset| SegmentPosition { value: self.value_at(chunk_offset), chunk_offset })
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.pos_list.len() * std::mem::size_of::<strata_types::RowId>()
    }
}
