//! Position lists
//!
//! Scans and joins emit their matches as ordered lists of [`RowId`]s.
//! Reference segments share a position list through an `Arc`; once a list
//! has been handed to a consumer it is never mutated again. Outer joins pad
//! the unmatched side with `NULL_ROW_ID` entries.

use strata_types::RowId;

pub type PosList = Vec<RowId>;
