//! Primitive handles shared across the engine
//!
//! Widths are load-bearing: `max_chunk_size` is a `u32` and table row counts
//! are `u64`, so `max_chunk_size as u64 * chunk_id as u64` never overflows
//! for any in-range chunk.

/// Index of a chunk within a table.
pub type ChunkId = u32;

/// Index of a row within a chunk.
pub type ChunkOffset = u32;

/// Index of a column within a table schema.
pub type ColumnId = u16;

/// Index into a dictionary segment's sorted dictionary.
pub type ValueId = u32;

/// Returned by dictionary bound lookups when probed with NULL.
pub const INVALID_VALUE_ID: ValueId = ValueId::MAX;

/// Address of a single row: which chunk, and which slot within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId {
    pub chunk_id: ChunkId,
    pub chunk_offset: ChunkOffset,
}

/// Sentinel row id used to pad the unmatched side of outer joins.
pub const NULL_ROW_ID: RowId = RowId { chunk_id: ChunkId::MAX, chunk_offset: ChunkOffset::MAX };

impl RowId {
    pub fn new(chunk_id: ChunkId, chunk_offset: ChunkOffset) -> Self {
        RowId { chunk_id, chunk_offset }
    }

    /// Whether this row id is the NULL sentinel.
    #[inline]
    pub fn is_null(&self) -> bool {
        *self == NULL_ROW_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_row_id_sentinel() {
        assert!(NULL_ROW_ID.is_null());
        assert!(!RowId::new(0, 0).is_null());
        // Only the all-max pattern is the sentinel
        assert!(!RowId::new(ChunkId::MAX, 0).is_null());
    }
}
