//! Nested-loop join
//!
//! Joins two tables under a binary predicate by comparing every left row
//! with every right row, chunk pair by chunk pair. Supports Inner, Left,
//! Right and Full Outer modes; the other modes have dedicated operators.
//! Performance is far behind a hash or sort-merge join, so this operator is
//! the fallback for predicates those cannot serve.
//!
//! Two dispatch paths with identical observable semantics:
//!
//! - *FAST PATH*: both segments have the same data type and the same
//!   encoding. The comparator and both iterators are monomorphized, so the
//!   inner loop inlines.
//! - *SLOW PATH*: anything else. Both segments resolve to erased iterators
//!   and the comparator is boxed over the two element types. TEXT columns
//!   only ever compare with TEXT columns; mixing fails hard.
//!
//! NULL values never match. Output rows are ordered lexicographically by
//! (left chunk, left offset, right chunk, right offset); an unmatched left
//! row is padded in place at its offset, unmatched right rows come last.

use std::sync::Arc;

use strata_storage::{
    erased_positions_owned, ColumnDefinition, PosList, Segment, SegmentPosition, SegmentType,
    Table, TableType, TypedSegment, UseMvcc,
};
use strata_types::{
    resolve_numeric_data_type, ChunkId, ChunkOffset, ColumnId, CompareWith, DataType,
    PredicateCondition, RowId, NULL_ROW_ID,
};

use crate::errors::ExecutorError;
use crate::operator::reference_writer::write_reference_segments;
use crate::operator::{JoinMode, Operator, OutputCache};

pub struct JoinNestedLoop {
    left: Arc<dyn Operator>,
    right: Arc<dyn Operator>,
    mode: JoinMode,
    column_ids: (ColumnId, ColumnId),
    condition: PredicateCondition,
    cache: OutputCache,
}

/// Shared match sink for both dispatch paths. Matches are staged per left
/// offset and flushed once the left chunk has seen every right chunk, which
/// yields the documented left-offset output order regardless of the
/// per-chunk-pair loop structure.
struct JoinParams<'a> {
    matches_per_left_row: &'a mut [Vec<RowId>],
    right_matches: &'a mut [bool],
    track_right_matches: bool,
}

impl JoinParams<'_> {
    #[inline]
    fn process_match(&mut self, left_offset: ChunkOffset, right_row: RowId) {
        self.matches_per_left_row[left_offset as usize].push(right_row);
        if self.track_right_matches {
            self.right_matches[right_row.chunk_offset as usize] = true;
        }
    }
}

impl JoinNestedLoop {
    pub fn new(
        left: Arc<dyn Operator>,
        right: Arc<dyn Operator>,
        mode: JoinMode,
        column_ids: (ColumnId, ColumnId),
        condition: PredicateCondition,
    ) -> Self {
        JoinNestedLoop { left, right, mode, column_ids, condition, cache: OutputCache::new() }
    }

    fn execute_join(&self) -> Result<Arc<Table>, ExecutorError> {
        match self.mode {
            JoinMode::Inner | JoinMode::Left | JoinMode::Right | JoinMode::Outer => {}
            other => return Err(ExecutorError::UnsupportedJoinMode(other)),
        }
        if self.condition.is_between() {
            return Err(ExecutorError::InvalidJoinPredicate(self.condition));
        }

        let mut left_table = self.left.execute()?;
        let mut right_table = self.right.execute()?;
        let (mut left_column_id, mut right_column_id) = self.column_ids;
        let mut predicate_condition = self.condition;

        // For Right Outer, swap the inputs so the preserved side sits on
        // the left, and flip the condition to keep its meaning
        let swapped = self.mode == JoinMode::Right;
        if swapped {
            std::mem::swap(&mut left_table, &mut right_table);
            std::mem::swap(&mut left_column_id, &mut right_column_id);
            predicate_condition = predicate_condition.flip();
        }

        let left_type = left_table.column_data_type(left_column_id)?;
        let right_type = right_table.column_data_type(right_column_id)?;
        if (left_type == DataType::Text) != (right_type == DataType::Text) {
            return Err(ExecutorError::TypeMismatch { left: left_type, right: right_type });
        }

        let is_outer_join = matches!(self.mode, JoinMode::Left | JoinMode::Right | JoinMode::Outer);
        let track_right_matches = self.mode == JoinMode::Outer;

        let mut pos_list_left = PosList::new();
        let mut pos_list_right = PosList::new();

        // For Full Outer, remember the matches on the right side
        let right_chunk_count = right_table.chunk_count();
        let mut right_matches: Vec<Vec<bool>> = Vec::with_capacity(right_chunk_count as usize);
        for right_chunk_id in 0..right_chunk_count {
            let size = if track_right_matches {
                right_table.get_chunk(right_chunk_id)?.size() as usize
            } else {
                0
            };
            right_matches.push(vec![false; size]);
        }

        for left_chunk_id in 0..left_table.chunk_count() {
            let left_chunk = left_table.get_chunk(left_chunk_id)?;
            let left_segment = left_chunk.segment(left_column_id)?;

            let mut matches_per_left_row: Vec<Vec<RowId>> =
                vec![Vec::new(); left_chunk.size() as usize];

            for right_chunk_id in 0..right_chunk_count {
                let right_segment =
                    right_table.get_chunk(right_chunk_id)?.segment(right_column_id)?;
                let mut params = JoinParams {
                    matches_per_left_row: &mut matches_per_left_row,
                    right_matches: &mut right_matches[right_chunk_id as usize],
                    track_right_matches,
                };
                join_two_untyped_segments(
                    predicate_condition,
                    left_segment,
                    right_segment,
                    right_chunk_id,
                    &mut params,
                )?;
            }

            // Flush in left-offset order: each left row's matches (ordered
            // by right chunk and offset), with outer modes padding an
            // unmatched left row in place
            for (offset, matched_rows) in matches_per_left_row.iter().enumerate() {
                if matched_rows.is_empty() {
                    if is_outer_join {
                        pos_list_left.push(RowId::new(left_chunk_id, offset as ChunkOffset));
                        pos_list_right.push(NULL_ROW_ID);
                    }
                    continue;
                }
                for right_row in matched_rows {
                    pos_list_left.push(RowId::new(left_chunk_id, offset as ChunkOffset));
                    pos_list_right.push(*right_row);
                }
            }
        }

        // Full Outer also preserves the unmatched rows of the right side;
        // unmatched left rows were added in the main loop
        if self.mode == JoinMode::Outer {
            for (right_chunk_id, chunk_matches) in right_matches.iter().enumerate() {
                for (offset, matched) in chunk_matches.iter().enumerate() {
                    if !matched {
                        pos_list_left.push(NULL_ROW_ID);
                        pos_list_right
                            .push(RowId::new(right_chunk_id as ChunkId, offset as ChunkOffset));
                    }
                }
            }
        }

        let pos_list_left = Arc::new(pos_list_left);
        let pos_list_right = Arc::new(pos_list_right);

        // Write one output chunk, swapping back so the original left columns
        // come first
        let mut segments = Vec::new();
        if swapped {
            write_reference_segments(&mut segments, &right_table, &pos_list_right)?;
            write_reference_segments(&mut segments, &left_table, &pos_list_left)?;
        } else {
            write_reference_segments(&mut segments, &left_table, &pos_list_left)?;
            write_reference_segments(&mut segments, &right_table, &pos_list_right)?;
        }

        let (first_table, second_table) =
            if swapped { (&right_table, &left_table) } else { (&left_table, &right_table) };
        let mut output = Table::new(
            output_definitions(first_table, second_table, self.mode),
            TableType::References,
            first_table.max_chunk_size().max(second_table.max_chunk_size()),
            UseMvcc::No,
        );
        output.append_chunk(segments)?;
        Ok(Arc::new(output))
    }
}

impl Operator for JoinNestedLoop {
    fn name(&self) -> &'static str {
        "JoinNestedLoop"
    }

    fn execute(&self) -> Result<Arc<Table>, ExecutorError> {
        self.cache.get_or_compute(self.name(), || self.execute_join())
    }

    fn left_input(&self) -> Option<Arc<dyn Operator>> {
        Some(Arc::clone(&self.left))
    }

    fn right_input(&self) -> Option<Arc<dyn Operator>> {
        Some(Arc::clone(&self.right))
    }

    fn deep_copy_with_inputs(
        &self,
        copied_left: Option<Arc<dyn Operator>>,
        copied_right: Option<Arc<dyn Operator>>,
    ) -> Arc<dyn Operator> {
        Arc::new(JoinNestedLoop::new(
            copied_left.unwrap_or_else(|| Arc::clone(&self.left)),
            copied_right.unwrap_or_else(|| Arc::clone(&self.right)),
            self.mode,
            self.column_ids,
            self.condition,
        ))
    }
}

/// Concatenated column definitions of both sides. Outer modes pad the
/// non-preserved side with NULLs, which makes its columns nullable.
fn output_definitions(
    left_table: &Table,
    right_table: &Table,
    mode: JoinMode,
) -> Vec<ColumnDefinition> {
    let left_padded = matches!(mode, JoinMode::Right | JoinMode::Outer);
    let right_padded = matches!(mode, JoinMode::Left | JoinMode::Outer);

    let mut definitions = Vec::with_capacity(left_table.column_count() + right_table.column_count());
    for definition in left_table.column_definitions() {
        let mut definition = definition.clone();
        definition.nullable |= left_padded;
        definitions.push(definition);
    }
    for definition in right_table.column_definitions() {
        let mut definition = definition.clone();
        definition.nullable |= right_padded;
        definitions.push(definition);
    }
    definitions
}

/// Dispatch the inner loop for one segment pair.
fn join_two_untyped_segments(
    condition: PredicateCondition,
    left_segment: &Segment,
    right_segment: &Segment,
    right_chunk_id: ChunkId,
    params: &mut JoinParams<'_>,
) -> Result<(), ExecutorError> {
    // FAST PATH: identical data type and identical encoding lets the
    // comparator and both iterators inline into the nested loop
    macro_rules! fast_path {
        ($($variant:ident),*) => {
            match (left_segment, right_segment) {
                $(
                    (
                        Segment::$variant(TypedSegment::Value(left)),
                        Segment::$variant(TypedSegment::Value(right)),
                    ) => {
                        join_two_typed_segments(
                            condition,
                            left.positions(None),
                            right.positions(None),
                            right_chunk_id,
                            params,
                        );
                        return Ok(());
                    }
                    (
                        Segment::$variant(TypedSegment::Dictionary(left)),
                        Segment::$variant(TypedSegment::Dictionary(right)),
                    ) => {
                        join_two_typed_segments(
                            condition,
                            left.positions(None),
                            right.positions(None),
                            right_chunk_id,
                            params,
                        );
                        return Ok(());
                    }
                )*
                _ => {}
            }
        };
    }
    fast_path!(Int, Long, Float, Double, Text);

    // SLOW PATH: erase both encodings and box the comparator over the two
    // element types
    let left_type = left_segment.data_type();
    let right_type = right_segment.data_type();
    match (left_type == DataType::Text, right_type == DataType::Text) {
        (true, true) => join_two_erased_segments::<String, String>(
            condition,
            left_segment,
            right_segment,
            right_chunk_id,
            params,
        ),
        (false, false) => resolve_numeric_data_type!(left_type, L => {
            resolve_numeric_data_type!(right_type, R => {
                join_two_erased_segments::<L, R>(
                    condition,
                    left_segment,
                    right_segment,
                    right_chunk_id,
                    params,
                )
            })
        }),
        _ => Err(ExecutorError::TypeMismatch { left: left_type, right: right_type }),
    }
}

/// A comparator closure for a binary condition over two element types.
fn comparator_for<L, R>(condition: PredicateCondition) -> impl Fn(&L, &R) -> bool
where
    L: CompareWith<R>,
{
    move |left, right| match left.compare_with(right) {
        Some(ordering) => condition.matches(ordering),
        None => false,
    }
}

/// The monomorphized nested loop. Positions with NULL on either side are
/// skipped before the comparator runs.
fn join_two_typed_segments<'a, T, LeftIter, RightIter>(
    condition: PredicateCondition,
    left_positions: LeftIter,
    right_positions: RightIter,
    right_chunk_id: ChunkId,
    params: &mut JoinParams<'_>,
) where
    T: CompareWith<T> + 'a,
    LeftIter: Iterator<Item = SegmentPosition<&'a T>>,
    RightIter: Iterator<Item = SegmentPosition<&'a T>> + Clone,
{
    let comparator = comparator_for::<T, T>(condition);
    for left in left_positions {
        let Some(left_value) = left.value else { continue };
        for right in right_positions.clone() {
            let Some(right_value) = right.value else { continue };
            if comparator(left_value, right_value) {
                params.process_match(
                    left.chunk_offset,
                    RowId::new(right_chunk_id, right.chunk_offset),
                );
            }
        }
    }
}

/// The erased nested loop: boxed comparator, boxed left iterator, right
/// side materialized once since it is re-walked per left row.
fn join_two_erased_segments<L, R>(
    condition: PredicateCondition,
    left_segment: &Segment,
    right_segment: &Segment,
    right_chunk_id: ChunkId,
    params: &mut JoinParams<'_>,
) -> Result<(), ExecutorError>
where
    L: SegmentType + CompareWith<R>,
    R: SegmentType,
{
    let comparator: Box<dyn Fn(&L, &R) -> bool> = Box::new(comparator_for::<L, R>(condition));
    let left_positions = erased_positions_owned::<L>(left_segment, None)?;
    let right_positions: Vec<SegmentPosition<R>> =
        erased_positions_owned::<R>(right_segment, None)?.collect();

    for left in left_positions {
        let Some(left_value) = &left.value else { continue };
        for right in &right_positions {
            let Some(right_value) = &right.value else { continue };
            if comparator(left_value, right_value) {
                params.process_match(
                    left.chunk_offset,
                    RowId::new(right_chunk_id, right.chunk_offset),
                );
            }
        }
    }
    Ok(())
}
