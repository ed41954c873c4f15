//! Dictionary segments
//!
//! Dictionary encoding stores each distinct value once, in a sorted
//! dictionary, and replaces the row data with a vector of codes into it.
//! The code `|dictionary|` encodes NULL, so the attribute vector alone
//! distinguishes NULL rows and range tests on codes can exclude NULL
//! without a separate bitmap.

use strata_types::{ChunkOffset, ColumnType, Value, ValueId, INVALID_VALUE_ID};

use crate::segment::iterate::{offset_cursor, DictionaryCodeIter, DictionarySegmentIter};
use crate::segment::value_segment::ValueSegment;

#[derive(Debug, Clone, PartialEq)]
pub struct DictionarySegment<T> {
    dictionary: Vec<T>,
    attribute_vector: Vec<ValueId>,
}

impl<T: ColumnType> DictionarySegment<T> {
    /// Compress a value segment. The dictionary is the sorted set of
    /// distinct non-null values; every row becomes a code.
    pub fn from_value_segment(segment: &ValueSegment<T>) -> Self {
        let mut dictionary: Vec<T> = Vec::new();
        for offset in 0..segment.size() {
            if let Some(value) = segment.get(offset) {
                dictionary.push(value.clone());
            }
        }
        // NaN has no meaningful order; sort it last deterministically
        dictionary
            .sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Greater));
        dictionary.dedup();

        let null_code = dictionary.len() as ValueId;
        let attribute_vector = (0..segment.size())
            .map(|offset| match segment.get(offset) {
                Some(value) => {
                    dictionary.partition_point(|entry| entry < value) as ValueId
                }
                None => null_code,
            })
            .collect();

        DictionarySegment { dictionary, attribute_vector }
    }

    /// Build from raw parts. The dictionary must be sorted and unique and
    /// every code at most `|dictionary|` (the NULL code).
    pub fn from_parts(dictionary: Vec<T>, attribute_vector: Vec<ValueId>) -> Self {
        debug_assert!(
            dictionary.windows(2).all(|pair| pair[0] < pair[1]),
            "dictionary must be sorted and unique"
        );
        debug_assert!(
            attribute_vector.iter().all(|&code| code as usize <= dictionary.len()),
            "attribute codes must index the dictionary or be the NULL code"
        );
        DictionarySegment { dictionary, attribute_vector }
    }

    pub fn size(&self) -> ChunkOffset {
        self.attribute_vector.len() as ChunkOffset
    }

    pub fn unique_values_count(&self) -> ValueId {
        self.dictionary.len() as ValueId
    }

    /// The code that encodes NULL in the attribute vector.
    pub fn null_value_id(&self) -> ValueId {
        self.dictionary.len() as ValueId
    }

    pub fn dictionary(&self) -> &[T] {
        &self.dictionary
    }

    pub fn attribute_vector(&self) -> &[ValueId] {
        &self.attribute_vector
    }

    /// The first dictionary code whose value is not less than `value`, or
    /// `INVALID_VALUE_ID` when probed with NULL.
    pub fn lower_bound(&self, value: &Value) -> ValueId {
        match self.probe(value) {
            Some(typed) => self.lower_bound_typed(&typed),
            None => INVALID_VALUE_ID,
        }
    }

    /// The first dictionary code whose value is greater than `value`, or
    /// `INVALID_VALUE_ID` when probed with NULL.
    pub fn upper_bound(&self, value: &Value) -> ValueId {
        match self.probe(value) {
            Some(typed) => self.upper_bound_typed(&typed),
            None => INVALID_VALUE_ID,
        }
    }

    pub fn lower_bound_typed(&self, value: &T) -> ValueId {
        self.dictionary.partition_point(|entry| entry < value) as ValueId
    }

    pub fn upper_bound_typed(&self, value: &T) -> ValueId {
        self.dictionary.partition_point(|entry| entry <= value) as ValueId
    }

    fn probe(&self, value: &Value) -> Option<T> {
        if value.is_null() {
            return None;
        }
        let cast = value.cast_to(T::DATA_TYPE)?;
        T::from_value(&cast)
    }

    /// The dictionary value for a (non-NULL) code.
    pub fn value_of_value_id(&self, value_id: ValueId) -> &T {
        &self.dictionary[value_id as usize]
    }

    #[inline]
    pub fn is_null_at(&self, chunk_offset: ChunkOffset) -> bool {
        self.attribute_vector[chunk_offset as usize] == self.null_value_id()
    }

    /// The value at `chunk_offset`, or `None` for NULL.
    #[inline]
    pub fn get(&self, chunk_offset: ChunkOffset) -> Option<&T> {
        let code = self.attribute_vector[chunk_offset as usize] as usize;
        self.dictionary.get(code)
    }

    /// Iterate positions, materializing values through the dictionary.
    pub fn positions<'a>(
        &'a self,
        position_filter: Option<&'a [ChunkOffset]>,
    ) -> DictionarySegmentIter<'a, T> {
        DictionarySegmentIter {
            dictionary: &self.dictionary,
            attribute_vector: &self.attribute_vector,
            offsets: offset_cursor(self.size(), position_filter),
        }
    }

    /// Iterate raw attribute codes (the scan fast path works on codes and
    /// never touches the dictionary).
    pub fn code_values<'a>(
        &'a self,
        position_filter: Option<&'a [ChunkOffset]>,
    ) -> DictionaryCodeIter<'a> {
        DictionaryCodeIter {
            attribute_vector: &self.attribute_vector,
            offsets: offset_cursor(self.size(), position_filter),
        }
    }

    pub fn estimate_memory_usage(&self) -> usize {
        let heap: usize = self.dictionary.iter().map(ColumnType::heap_size).sum();
        self.dictionary.len() * std::mem::size_of::<T>()
            + self.attribute_vector.len() * std::mem::size_of::<ValueId>()
            + heap
    }
}
