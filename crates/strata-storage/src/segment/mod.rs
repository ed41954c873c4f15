//! Segments: one column's storage within one chunk
//!
//! Encodings form a closed set, so dispatch is exhaustive matching instead
//! of downcasting: [`TypedSegment`] is the encoding variant for one element
//! type, [`Segment`] closes over the element types and adds the reference
//! encoding. Hot loops resolve down to a concrete `(type, encoding)` pair
//! and monomorphize; tolerant callers go through the erased iterators.

pub mod iterate;

mod dictionary_segment;
mod reference_segment;
mod value_segment;

pub use dictionary_segment::DictionarySegment;
pub use reference_segment::ReferenceSegment;
pub use value_segment::ValueSegment;

use strata_types::{ChunkOffset, ColumnType, DataType, Value};

use crate::error::StorageError;
use crate::segment::iterate::SegmentPosition;

/// One element type's segment, over either encoding.
#[derive(Debug, Clone)]
pub enum TypedSegment<T> {
    Value(ValueSegment<T>),
    Dictionary(DictionarySegment<T>),
}

impl<T: ColumnType> TypedSegment<T> {
    pub fn size(&self) -> ChunkOffset {
        match self {
            TypedSegment::Value(segment) => segment.size(),
            TypedSegment::Dictionary(segment) => segment.size(),
        }
    }

    #[inline]
    pub fn is_null_at(&self, chunk_offset: ChunkOffset) -> bool {
        match self {
            TypedSegment::Value(segment) => segment.is_null_at(chunk_offset),
            TypedSegment::Dictionary(segment) => segment.is_null_at(chunk_offset),
        }
    }

    /// The value at `chunk_offset`, or `None` for NULL.
    #[inline]
    pub fn get(&self, chunk_offset: ChunkOffset) -> Option<&T> {
        match self {
            TypedSegment::Value(segment) => segment.get(chunk_offset),
            TypedSegment::Dictionary(segment) => segment.get(chunk_offset),
        }
    }

    /// Erased iteration: the element type stays concrete but the encoding is
    /// hidden behind the box.
    pub fn erased_positions<'a>(
        &'a self,
        position_filter: Option<&'a [ChunkOffset]>,
    ) -> Box<dyn Iterator<Item = SegmentPosition<&'a T>> + 'a> {
        match self {
            TypedSegment::Value(segment) => Box::new(segment.positions(position_filter)),
            TypedSegment::Dictionary(segment) => Box::new(segment.positions(position_filter)),
        }
    }

    pub fn estimate_memory_usage(&self) -> usize {
        match self {
            TypedSegment::Value(segment) => segment.estimate_memory_usage(),
            TypedSegment::Dictionary(segment) => segment.estimate_memory_usage(),
        }
    }
}

/// The closed set of segments a chunk can hold.
#[derive(Debug, Clone)]
pub enum Segment {
    Int(TypedSegment<i32>),
    Long(TypedSegment<i64>),
    Float(TypedSegment<f32>),
    Double(TypedSegment<f64>),
    Text(TypedSegment<String>),
    Reference(ReferenceSegment),
}

impl Segment {
    /// Create an empty value segment for a column of `data_type`.
    pub fn new_value_segment(data_type: DataType, nullable: bool) -> Segment {
        match data_type {
            DataType::Int => Segment::Int(TypedSegment::Value(ValueSegment::new(nullable))),
            DataType::Long => Segment::Long(TypedSegment::Value(ValueSegment::new(nullable))),
            DataType::Float => Segment::Float(TypedSegment::Value(ValueSegment::new(nullable))),
            DataType::Double => Segment::Double(TypedSegment::Value(ValueSegment::new(nullable))),
            DataType::Text => Segment::Text(TypedSegment::Value(ValueSegment::new(nullable))),
        }
    }

    pub fn size(&self) -> ChunkOffset {
        match self {
            Segment::Int(segment) => segment.size(),
            Segment::Long(segment) => segment.size(),
            Segment::Float(segment) => segment.size(),
            Segment::Double(segment) => segment.size(),
            Segment::Text(segment) => segment.size(),
            Segment::Reference(segment) => segment.size(),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Segment::Int(_) => DataType::Int,
            Segment::Long(_) => DataType::Long,
            Segment::Float(_) => DataType::Float,
            Segment::Double(_) => DataType::Double,
            Segment::Text(_) => DataType::Text,
            Segment::Reference(segment) => segment.data_type(),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Segment::Reference(_))
    }

    /// The value at `chunk_offset` as a [`Value`], or `None` for NULL.
    pub fn value_at(&self, chunk_offset: ChunkOffset) -> Option<Value> {
        match self {
            Segment::Int(segment) => segment.get(chunk_offset).map(|v| v.clone().into_value()),
            Segment::Long(segment) => segment.get(chunk_offset).map(|v| v.clone().into_value()),
            Segment::Float(segment) => segment.get(chunk_offset).map(|v| v.clone().into_value()),
            Segment::Double(segment) => segment.get(chunk_offset).map(|v| v.clone().into_value()),
            Segment::Text(segment) => segment.get(chunk_offset).map(|v| v.clone().into_value()),
            Segment::Reference(segment) => segment.value_at(chunk_offset),
        }
    }

    /// Append one value. Only value segments are appendable.
    pub(crate) fn push(&mut self, value: &Value) -> Result<(), StorageError> {
        match self {
            Segment::Int(TypedSegment::Value(segment)) => segment.push(value),
            Segment::Long(TypedSegment::Value(segment)) => segment.push(value),
            Segment::Float(TypedSegment::Value(segment)) => segment.push(value),
            Segment::Double(TypedSegment::Value(segment)) => segment.push(value),
            Segment::Text(TypedSegment::Value(segment)) => segment.push(value),
            _ => Err(StorageError::SegmentNotAppendable),
        }
    }

    pub fn estimate_memory_usage(&self) -> usize {
        match self {
            Segment::Int(segment) => segment.estimate_memory_usage(),
            Segment::Long(segment) => segment.estimate_memory_usage(),
            Segment::Float(segment) => segment.estimate_memory_usage(),
            Segment::Double(segment) => segment.estimate_memory_usage(),
            Segment::Text(segment) => segment.estimate_memory_usage(),
            Segment::Reference(segment) => segment.estimate_memory_usage(),
        }
    }
}

/// Recovers the typed view of an erased [`Segment`] for one element type.
/// The static half of segment resolution: callers match on
/// [`Segment::data_type`] (or use `resolve_data_type!`) and then extract the
/// matching [`TypedSegment`].
pub trait SegmentType: ColumnType {
    fn typed_segment(segment: &Segment) -> Option<&TypedSegment<Self>>
    where
        Self: Sized;
}

macro_rules! segment_type_impl {
    ($rust_type:ty, $variant:ident) => {
        impl SegmentType for $rust_type {
            fn typed_segment(segment: &Segment) -> Option<&TypedSegment<Self>> {
                match segment {
                    Segment::$variant(typed) => Some(typed),
                    _ => None,
                }
            }
        }
    };
}

segment_type_impl!(i32, Int);
segment_type_impl!(i64, Long);
segment_type_impl!(f32, Float);
segment_type_impl!(f64, Double);
segment_type_impl!(String, Text);

/// Fully erased iteration with owned values: both the encoding and the
/// storage behind it (including reference indirection) are hidden. This is
/// the slow-dispatch surface; positions clone their values.
///
/// Fails if the segment's data type does not match `T`.
pub fn erased_positions_owned<'a, T: SegmentType>(
    segment: &'a Segment,
    position_filter: Option<&'a [ChunkOffset]>,
) -> Result<Box<dyn Iterator<Item = SegmentPosition<T>> + 'a>, StorageError> {
    if segment.data_type() != T::DATA_TYPE {
        return Err(StorageError::DataTypeMismatch {
            expected: T::DATA_TYPE,
            actual: segment.data_type(),
        });
    }

    if let Segment::Reference(reference) = segment {
        return Ok(Box::new(reference.positions(position_filter).map(|position| {
            SegmentPosition {
                value: position.value.as_ref().and_then(T::from_value),
                chunk_offset: position.chunk_offset,
            }
        })));
    }

    // Non-reference segment of the right data type always resolves
    let typed = T::typed_segment(segment).ok_or(StorageError::DataTypeMismatch {
        expected: T::DATA_TYPE,
        actual: segment.data_type(),
    })?;
    Ok(Box::new(typed.erased_positions(position_filter).map(|position| SegmentPosition {
        value: position.value.cloned(),
        chunk_offset: position.chunk_offset,
    })))
}
