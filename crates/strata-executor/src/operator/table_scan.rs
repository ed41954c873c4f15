//! Column-between table scan
//!
//! Filters one column against a `[lower, upper]` bound pair (one of the
//! four between variants) and emits a References table: one output chunk
//! per input chunk, every column a reference segment over that chunk's
//! matches.
//!
//! Two scanning paths with identical observable behavior:
//!
//! - *Dictionary path*: the bound pair maps to a value-id range via
//!   `lower_bound`/`upper_bound`, reducing the row test to one unsigned
//!   subtraction on attribute codes. NULL (the code past the dictionary)
//!   falls out of the range arithmetically.
//! - *Generic path*: typed iteration with the bounds cast to the column
//!   type and an inlined comparator; reference segments go through the
//!   erased iterators instead.
//!
//! NULL semantics: a NULL bound yields an empty result, NULL column values
//! never match.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use strata_storage::{
    DictionarySegment, PosList, Segment, SegmentPosition, SegmentType, Table, TableType,
    TypedSegment, UseMvcc, ValueSegment,
};
use strata_types::{
    resolve_data_type, ChunkId, ChunkOffset, ColumnId, ColumnType, PredicateCondition, RowId,
    Value, INVALID_VALUE_ID,
};

use crate::errors::ExecutorError;
use crate::operator::reference_writer::write_reference_segments;
use crate::operator::{Operator, OutputCache};

pub struct ColumnBetweenScan {
    input: Arc<dyn Operator>,
    column_id: ColumnId,
    lower: Value,
    upper: Value,
    condition: PredicateCondition,
    cache: OutputCache,
}

impl ColumnBetweenScan {
    pub fn new(
        input: Arc<dyn Operator>,
        column_id: ColumnId,
        lower: Value,
        upper: Value,
        condition: PredicateCondition,
    ) -> Self {
        ColumnBetweenScan { input, column_id, lower, upper, condition, cache: OutputCache::new() }
    }

    /// Scan a single chunk, returning the matching row ids in input order.
    /// A position filter restricts the scan to the given offsets; matches
    /// keep their original offsets.
    pub fn scan_chunk(
        &self,
        table: &Table,
        chunk_id: ChunkId,
        position_filter: Option<&[ChunkOffset]>,
    ) -> Result<PosList, ExecutorError> {
        self.validate(table)?;
        let mut matches = PosList::new();

        // Comparing anything with NULL yields UNKNOWN, so a NULL bound can
        // never match a row
        if self.lower.is_null() || self.upper.is_null() {
            return Ok(matches);
        }

        let segment = table.get_chunk(chunk_id)?.segment(self.column_id)?;

        match segment {
            Segment::Int(typed) => {
                self.scan_typed_segment(typed, chunk_id, position_filter, &mut matches)?
            }
            Segment::Long(typed) => {
                self.scan_typed_segment(typed, chunk_id, position_filter, &mut matches)?
            }
            Segment::Float(typed) => {
                self.scan_typed_segment(typed, chunk_id, position_filter, &mut matches)?
            }
            Segment::Double(typed) => {
                self.scan_typed_segment(typed, chunk_id, position_filter, &mut matches)?
            }
            Segment::Text(typed) => {
                self.scan_typed_segment(typed, chunk_id, position_filter, &mut matches)?
            }
            Segment::Reference(_) => {
                self.scan_erased_segment(segment, chunk_id, position_filter, &mut matches)?
            }
        }
        Ok(matches)
    }

    fn validate(&self, table: &Table) -> Result<(), ExecutorError> {
        if !self.condition.is_between() {
            return Err(ExecutorError::UnreachablePredicate(self.condition));
        }
        let column_type = table.column_data_type(self.column_id)?;
        for bound in [&self.lower, &self.upper] {
            if !bound.is_null() && bound.cast_to(column_type).is_none() {
                return Err(ExecutorError::TypeMismatch {
                    left: column_type,
                    right: bound.data_type().unwrap_or(column_type),
                });
            }
        }
        Ok(())
    }

    /// Both bounds cast to the column's element type. Only called after
    /// `validate` and the NULL early-out.
    fn typed_bounds<T: ColumnType>(&self) -> Result<(T, T), ExecutorError> {
        let cast = |bound: &Value| -> Result<T, ExecutorError> {
            bound
                .cast_to(T::DATA_TYPE)
                .as_ref()
                .and_then(T::from_value)
                .ok_or(ExecutorError::TypeMismatch {
                    left: T::DATA_TYPE,
                    right: bound.data_type().unwrap_or(T::DATA_TYPE),
                })
        };
        Ok((cast(&self.lower)?, cast(&self.upper)?))
    }

    fn scan_typed_segment<T: SegmentType>(
        &self,
        segment: &TypedSegment<T>,
        chunk_id: ChunkId,
        position_filter: Option<&[ChunkOffset]>,
        matches: &mut PosList,
    ) -> Result<(), ExecutorError> {
        let (lower, upper) = self.typed_bounds::<T>()?;
        match segment {
            TypedSegment::Dictionary(dictionary) => {
                self.scan_dictionary_segment(dictionary, chunk_id, position_filter, matches);
            }
            TypedSegment::Value(values) => {
                self.scan_generic(values, &lower, &upper, chunk_id, position_filter, matches);
            }
        }
        Ok(())
    }

    fn scan_generic<T: ColumnType>(
        &self,
        segment: &ValueSegment<T>,
        lower: &T,
        upper: &T,
        chunk_id: ChunkId,
        position_filter: Option<&[ChunkOffset]>,
        matches: &mut PosList,
    ) {
        scan_positions(
            self.condition,
            lower,
            upper,
            segment.positions(position_filter),
            chunk_id,
            matches,
        );
    }

    /// Generic fallback for segments that only iterate erased (references).
    fn scan_erased_segment(
        &self,
        segment: &Segment,
        chunk_id: ChunkId,
        position_filter: Option<&[ChunkOffset]>,
        matches: &mut PosList,
    ) -> Result<(), ExecutorError> {
        resolve_data_type!(segment.data_type(), T => {
            let (lower, upper) = self.typed_bounds::<T>()?;
            let positions = strata_storage::erased_positions_owned::<T>(segment, position_filter)?;
            scan_positions(self.condition, &lower, &upper, positions, chunk_id, matches);
            Ok(())
        })
    }

    /// Dictionary fast path: translate the bounds into a value-id range
    /// and test codes instead of values.
    fn scan_dictionary_segment<T: ColumnType>(
        &self,
        segment: &DictionarySegment<T>,
        chunk_id: ChunkId,
        position_filter: Option<&[ChunkOffset]>,
        matches: &mut PosList,
    ) {
        let left_value_id = if self.condition.is_between_lower_inclusive() {
            segment.lower_bound(&self.lower)
        } else {
            segment.upper_bound(&self.lower)
        };

        let mut right_value_id = if self.condition.is_between_upper_inclusive() {
            segment.upper_bound(&self.upper)
        } else {
            segment.lower_bound(&self.upper)
        };

        let unique_values_count = segment.unique_values_count();
        if right_value_id == INVALID_VALUE_ID {
            // bound lookups report NULL probes as INVALID_VALUE_ID while the
            // attribute vector encodes NULL as unique_values_count
            right_value_id = unique_values_count;
        }

        if left_value_id == 0 && right_value_id == unique_values_count {
            // every non-null row matches; no code comparison needed
            let null_value_id = segment.null_value_id();
            for (chunk_offset, code) in segment.code_values(position_filter) {
                if code != null_value_id {
                    matches.push(RowId::new(chunk_id, chunk_offset));
                }
            }
            return;
        }

        if left_value_id >= unique_values_count || left_value_id >= right_value_id {
            // no dictionary value falls inside the bounds
            return;
        }

        let value_id_diff = right_value_id - left_value_id;
        for (chunk_offset, code) in segment.code_values(position_filter) {
            // (code >= left && code < right) === (code - left) < (right - left)
            // in unsigned arithmetic; the NULL code lies past right and is
            // excluded without a branch
            if code.wrapping_sub(left_value_id) < value_id_diff {
                matches.push(RowId::new(chunk_id, chunk_offset));
            }
        }
    }
}

impl Operator for ColumnBetweenScan {
    fn name(&self) -> &'static str {
        "ColumnBetweenScan"
    }

    fn execute(&self) -> Result<Arc<Table>, ExecutorError> {
        self.cache.get_or_compute(self.name(), || {
            let input_table = self.input.execute()?;
            self.validate(&input_table)?;

            let chunk_count = input_table.chunk_count();

            #[cfg(feature = "parallel")]
            let chunk_matches: Vec<PosList> = (0..chunk_count)
                .into_par_iter()
                .map(|chunk_id| self.scan_chunk(&input_table, chunk_id, None))
                .collect::<Result<_, _>>()?;

            #[cfg(not(feature = "parallel"))]
            let chunk_matches: Vec<PosList> = (0..chunk_count)
                .map(|chunk_id| self.scan_chunk(&input_table, chunk_id, None))
                .collect::<Result<_, _>>()?;

            let mut output = Table::new(
                input_table.column_definitions().to_vec(),
                TableType::References,
                input_table.max_chunk_size(),
                UseMvcc::No,
            );
            for chunk_match in chunk_matches {
                let pos_list = Arc::new(chunk_match);
                let mut segments = Vec::with_capacity(input_table.column_count());
                write_reference_segments(&mut segments, &input_table, &pos_list)?;
                output.append_chunk(segments)?;
            }
            Ok(Arc::new(output))
        })
    }

    fn left_input(&self) -> Option<Arc<dyn Operator>> {
        Some(Arc::clone(&self.input))
    }

    fn right_input(&self) -> Option<Arc<dyn Operator>> {
        None
    }

    fn deep_copy_with_inputs(
        &self,
        copied_left: Option<Arc<dyn Operator>>,
        _copied_right: Option<Arc<dyn Operator>>,
    ) -> Arc<dyn Operator> {
        Arc::new(ColumnBetweenScan::new(
            copied_left.unwrap_or_else(|| Arc::clone(&self.input)),
            self.column_id,
            self.lower.clone(),
            self.upper.clone(),
            self.condition,
        ))
    }
}

/// The generic hot loop: emit every non-null position whose value satisfies
/// the between comparator. One monomorphized loop per condition so the
/// comparator inlines.
fn scan_positions<T, P, I>(
    condition: PredicateCondition,
    lower: &T,
    upper: &T,
    positions: I,
    chunk_id: ChunkId,
    matches: &mut PosList,
) where
    T: PartialOrd,
    P: std::borrow::Borrow<T>,
    I: Iterator<Item = SegmentPosition<P>>,
{
    match condition {
        PredicateCondition::BetweenInclusive => {
            collect_matches::<T, P, I, _>(positions, chunk_id, matches, |value| {
                lower <= value && value <= upper
            })
        }
        PredicateCondition::BetweenLowerExclusive => {
            collect_matches::<T, P, I, _>(positions, chunk_id, matches, |value| {
                lower < value && value <= upper
            })
        }
        PredicateCondition::BetweenUpperExclusive => {
            collect_matches::<T, P, I, _>(positions, chunk_id, matches, |value| {
                lower <= value && value < upper
            })
        }
        PredicateCondition::BetweenExclusive => {
            collect_matches::<T, P, I, _>(positions, chunk_id, matches, |value| {
                lower < value && value < upper
            })
        }
        // `validate` rejects everything else before scanning starts
        _ => debug_assert!(false, "scan_positions called with a non-between condition"),
    }
}

#[inline]
fn collect_matches<T, P, I, F>(positions: I, chunk_id: ChunkId, matches: &mut PosList, predicate: F)
where
    P: std::borrow::Borrow<T>,
    I: Iterator<Item = SegmentPosition<P>>,
    F: Fn(&T) -> bool,
{
    for position in positions {
        if let Some(value) = &position.value {
            if predicate(value.borrow()) {
                matches.push(RowId::new(chunk_id, position.chunk_offset));
            }
        }
    }
}
