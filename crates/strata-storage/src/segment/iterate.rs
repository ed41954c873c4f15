//! Segment iteration substrate
//!
//! Every segment yields a lazy, finite, single-pass sequence of positions:
//! `(value, chunk_offset)` where the value is `None` for NULL. NULL is a
//! position-level flag, not a sentinel value, so comparators downstream only
//! ever see real values.
//!
//! Two dispatch shapes share this surface:
//!
//! - *Typed iteration*: the concrete iterator types in this module,
//!   monomorphized on element type and encoding. Hot loops that must inline
//!   a comparator use these.
//! - *Erased iteration*: boxed iterators with the encoding hidden (see
//!   [`TypedSegment::erased_positions`](crate::segment::TypedSegment) and
//!   [`erased_positions_owned`](crate::segment::erased_positions_owned)),
//!   trading inline-ability for compile time.
//!
//! An optional *position filter* restricts iteration to the given offsets,
//! visited in filter order. Positions keep their original chunk offsets.

use strata_types::{ChunkOffset, ValueId};

/// One position of a segment: the value (`None` for NULL) and the offset of
/// the row inside its chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPosition<T> {
    pub value: Option<T>,
    pub chunk_offset: ChunkOffset,
}

impl<T> SegmentPosition<T> {
    #[inline]
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

/// Walks either all offsets of a segment or the offsets of a position
/// filter, in order.
#[derive(Debug, Clone)]
pub(crate) enum OffsetCursor<'a> {
    Sequential(std::ops::Range<ChunkOffset>),
    Filtered(std::slice::Iter<'a, ChunkOffset>),
}

impl Iterator for OffsetCursor<'_> {
    type Item = ChunkOffset;

    #[inline]
    fn next(&mut self) -> Option<ChunkOffset> {
        match self {
            OffsetCursor::Sequential(range) => range.next(),
            OffsetCursor::Filtered(iter) => iter.next().copied(),
        }
    }
}

pub(crate) fn offset_cursor<'a>(
    size: ChunkOffset,
    position_filter: Option<&'a [ChunkOffset]>,
) -> OffsetCursor<'a> {
    match position_filter {
        Some(filter) => OffsetCursor::Filtered(filter.iter()),
        None => OffsetCursor::Sequential(0..size),
    }
}

/// Typed iterator over a value segment.
#[derive(Debug, Clone)]
pub struct ValueSegmentIter<'a, T> {
    pub(crate) values: &'a [T],
    pub(crate) nulls: Option<&'a [bool]>,
    pub(crate) offsets: OffsetCursor<'a>,
}

impl<'a, T> Iterator for ValueSegmentIter<'a, T> {
    type Item = SegmentPosition<&'a T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let chunk_offset = self.offsets.next()?;
        let index = chunk_offset as usize;
        debug_assert!(index < self.values.len(), "position filter offset out of range");
        let is_null = self.nulls.is_some_and(|nulls| nulls[index]);
        let value = if is_null { None } else { Some(&self.values[index]) };
        Some(SegmentPosition { value, chunk_offset })
    }
}

/// Typed iterator over a dictionary segment, materializing values through
/// the dictionary. The NULL code (`|dictionary|`) maps to a NULL position.
#[derive(Debug, Clone)]
pub struct DictionarySegmentIter<'a, T> {
    pub(crate) dictionary: &'a [T],
    pub(crate) attribute_vector: &'a [ValueId],
    pub(crate) offsets: OffsetCursor<'a>,
}

impl<'a, T> Iterator for DictionarySegmentIter<'a, T> {
    type Item = SegmentPosition<&'a T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let chunk_offset = self.offsets.next()?;
        let index = chunk_offset as usize;
        debug_assert!(index < self.attribute_vector.len(), "position filter offset out of range");
        let code = self.attribute_vector[index] as usize;
        Some(SegmentPosition { value: self.dictionary.get(code), chunk_offset })
    }
}

/// Raw attribute-vector iterator for the dictionary scan fast path: yields
/// `(chunk_offset, code)` pairs including the NULL code, so range tests on
/// codes can exclude NULL arithmetically instead of branching on it.
#[derive(Debug, Clone)]
pub struct DictionaryCodeIter<'a> {
    pub(crate) attribute_vector: &'a [ValueId],
    pub(crate) offsets: OffsetCursor<'a>,
}

impl Iterator for DictionaryCodeIter<'_> {
    type Item = (ChunkOffset, ValueId);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let chunk_offset = self.offsets.next()?;
        let index = chunk_offset as usize;
        debug_assert!(index < self.attribute_vector.len(), "position filter offset out of range");
        Some((chunk_offset, self.attribute_vector[index]))
    }
}
