//! Value segments
//!
//! The plain encoding: a dense typed vector plus an optional null bitmap of
//! equal length. NULL slots keep a default placeholder in the value vector
//! so offsets stay aligned.

use strata_types::{ChunkOffset, ColumnType, Value};

use crate::error::StorageError;
use crate::segment::iterate::{offset_cursor, ValueSegmentIter};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSegment<T> {
    values: Vec<T>,
    nulls: Option<Vec<bool>>,
}

impl<T: ColumnType> ValueSegment<T> {
    /// Create an empty segment. Nullable segments carry a null bitmap.
    pub fn new(nullable: bool) -> Self {
        ValueSegment { values: Vec::new(), nulls: nullable.then(Vec::new) }
    }

    /// Create a non-nullable segment from a vector of values.
    pub fn from_values(values: Vec<T>) -> Self {
        ValueSegment { values, nulls: None }
    }

    /// Create a nullable segment; `None` entries become NULL positions.
    pub fn from_nullable_values(values: Vec<Option<T>>) -> Self {
        let mut nulls = Vec::with_capacity(values.len());
        let values = values
            .into_iter()
            .map(|value| match value {
                Some(v) => {
                    nulls.push(false);
                    v
                }
                None => {
                    nulls.push(true);
                    T::default()
                }
            })
            .collect();
        ValueSegment { values, nulls: Some(nulls) }
    }

    pub fn size(&self) -> ChunkOffset {
        self.values.len() as ChunkOffset
    }

    pub fn is_nullable(&self) -> bool {
        self.nulls.is_some()
    }

    #[inline]
    pub fn is_null_at(&self, chunk_offset: ChunkOffset) -> bool {
        self.nulls.as_ref().is_some_and(|nulls| nulls[chunk_offset as usize])
    }

    /// The value at `chunk_offset`, or `None` for NULL.
    #[inline]
    pub fn get(&self, chunk_offset: ChunkOffset) -> Option<&T> {
        if self.is_null_at(chunk_offset) {
            None
        } else {
            Some(&self.values[chunk_offset as usize])
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn nulls(&self) -> Option<&[bool]> {
        self.nulls.as_deref()
    }

    /// Append one value. NULL requires the null bitmap; the value must be of
    /// the segment's exact type (callers validate against the schema first).
    pub(crate) fn push(&mut self, value: &Value) -> Result<(), StorageError> {
        if value.is_null() {
            let Some(nulls) = self.nulls.as_mut() else {
                return Err(StorageError::NullValueNotAllowed);
            };
            self.values.push(T::default());
            nulls.push(true);
            return Ok(());
        }

        let Some(typed) = T::from_value(value) else {
            return Err(StorageError::DataTypeMismatch {
                expected: T::DATA_TYPE,
                // value is non-null here, so it has a data type
                actual: value.data_type().unwrap_or(T::DATA_TYPE),
            });
        };
        self.values.push(typed);
        if let Some(nulls) = self.nulls.as_mut() {
            nulls.push(false);
        }
        Ok(())
    }

    /// Iterate positions, optionally restricted to a position filter.
    pub fn positions<'a>(
        &'a self,
        position_filter: Option<&'a [ChunkOffset]>,
    ) -> ValueSegmentIter<'a, T> {
        ValueSegmentIter {
            values: &self.values,
            nulls: self.nulls.as_deref(),
            offsets: offset_cursor(self.size(), position_filter),
        }
    }

    pub fn estimate_memory_usage(&self) -> usize {
        let heap: usize = self.values.iter().map(ColumnType::heap_size).sum();
        self.values.len() * std::mem::size_of::<T>()
            + self.nulls.as_ref().map_or(0, Vec::len)
            + heap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut segment = ValueSegment::<i32>::new(true);
        segment.push(&Value::Int(1)).unwrap();
        segment.push(&Value::Null).unwrap();
        segment.push(&Value::Int(3)).unwrap();

        assert_eq!(segment.size(), 3);
        assert_eq!(segment.get(0), Some(&1));
        assert_eq!(segment.get(1), None);
        assert_eq!(segment.get(2), Some(&3));
    }

    #[test]
    fn test_push_null_into_non_nullable_fails() {
        let mut segment = ValueSegment::<i32>::new(false);
        assert_eq!(segment.push(&Value::Null), Err(StorageError::NullValueNotAllowed));
    }

    #[test]
    fn test_push_wrong_type_fails() {
        let mut segment = ValueSegment::<i32>::new(false);
        assert!(matches!(
            segment.push(&Value::Long(1)),
            Err(StorageError::DataTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_positions_sequential() {
        let segment = ValueSegment::from_nullable_values(vec![Some(10), None, Some(30)]);
        let positions: Vec<_> = segment.positions(None).collect();

        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0].value, Some(&10));
        assert_eq!(positions[0].chunk_offset, 0);
        assert!(positions[1].is_null());
        assert_eq!(positions[2].value, Some(&30));
    }

    #[test]
    fn test_positions_with_filter_keep_original_offsets() {
        let segment = ValueSegment::from_values(vec![10, 20, 30, 40]);
        let filter = [3, 1];
        let positions: Vec<_> = segment.positions(Some(&filter)).collect();

        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].chunk_offset, 3);
        assert_eq!(positions[0].value, Some(&40));
        assert_eq!(positions[1].chunk_offset, 1);
        assert_eq!(positions[1].value, Some(&20));
    }
}
