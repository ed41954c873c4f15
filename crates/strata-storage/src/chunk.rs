//! Chunks: horizontal slices of a table
//!
//! A chunk holds one segment per column, all of identical length. Chunks of
//! MVCC-enabled tables additionally carry per-row version slots; this layer
//! only tracks the slot count.

use strata_types::{ChunkOffset, ColumnId, Value};

use crate::error::StorageError;
use crate::segment::Segment;

/// Per-row MVCC slots, reduced to their count. Present iff the owning table
/// was created with MVCC enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct MvccData {
    row_count: usize,
}

impl MvccData {
    pub fn new(row_count: usize) -> Self {
        MvccData { row_count }
    }

    pub fn size(&self) -> usize {
        self.row_count
    }

    fn grow_by(&mut self, rows: usize) {
        self.row_count += rows;
    }
}

#[derive(Debug, Clone)]
pub struct Chunk {
    segments: Vec<Segment>,
    mvcc: Option<MvccData>,
}

impl Chunk {
    pub(crate) fn new(segments: Vec<Segment>, mvcc: Option<MvccData>) -> Self {
        debug_assert!(
            segments.windows(2).all(|pair| pair[0].size() == pair[1].size()),
            "segments within a chunk must have the same length"
        );
        Chunk { segments, mvcc }
    }

    /// Number of rows in this chunk.
    pub fn size(&self) -> ChunkOffset {
        self.segments.first().map_or(0, Segment::size)
    }

    pub fn column_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment(&self, column_id: ColumnId) -> Result<&Segment, StorageError> {
        self.segments
            .get(column_id as usize)
            .ok_or(StorageError::ColumnIndexOutOfBounds { index: column_id })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_mvcc(&self) -> bool {
        self.mvcc.is_some()
    }

    pub fn mvcc_data(&self) -> Option<&MvccData> {
        self.mvcc.as_ref()
    }

    /// Append one row. Values are assumed schema-validated by the table.
    pub(crate) fn append(&mut self, values: &[Value]) -> Result<(), StorageError> {
        if values.len() != self.segments.len() {
            return Err(StorageError::ColumnCountMismatch {
                expected: self.segments.len(),
                actual: values.len(),
            });
        }
        for (segment, value) in self.segments.iter_mut().zip(values) {
            segment.push(value)?;
        }
        if let Some(mvcc) = self.mvcc.as_mut() {
            mvcc.grow_by(1);
        }
        Ok(())
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.segments.iter().map(Segment::estimate_memory_usage).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::DataType;

    fn two_column_chunk() -> Chunk {
        Chunk::new(
            vec![
                Segment::new_value_segment(DataType::Int, false),
                Segment::new_value_segment(DataType::Text, true),
            ],
            None,
        )
    }

    #[test]
    fn test_append_and_size() {
        let mut chunk = two_column_chunk();
        chunk.append(&[Value::Int(1), Value::Text("a".into())]).unwrap();
        chunk.append(&[Value::Int(2), Value::Null]).unwrap();

        assert_eq!(chunk.size(), 2);
        assert_eq!(chunk.segment(0).unwrap().value_at(1), Some(Value::Int(2)));
        assert_eq!(chunk.segment(1).unwrap().value_at(1), None);
    }

    #[test]
    fn test_append_arity_mismatch() {
        let mut chunk = two_column_chunk();
        assert_eq!(
            chunk.append(&[Value::Int(1)]),
            Err(StorageError::ColumnCountMismatch { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn test_mvcc_slots_grow_with_rows() {
        let mut chunk = Chunk::new(
            vec![Segment::new_value_segment(DataType::Int, false)],
            Some(MvccData::new(0)),
        );
        chunk.append(&[Value::Int(1)]).unwrap();
        chunk.append(&[Value::Int(2)]).unwrap();

        assert_eq!(chunk.mvcc_data().unwrap().size(), 2);
    }
}
