//! Types - Strata Type System
//!
//! This crate provides the type system for the Strata query engine core:
//! - Column data type definitions (INT, LONG, FLOAT, DOUBLE, TEXT)
//! - Tagged value representation with explicit NULL
//! - Primitive handles for chunks, rows and columns
//! - Predicate conditions and cross-type comparison rules

mod compare;
mod condition;
mod data_type;
mod ids;
mod value;

pub use compare::CompareWith;
pub use condition::PredicateCondition;
pub use data_type::{ColumnType, DataType};
pub use ids::{
    ChunkId, ChunkOffset, ColumnId, RowId, ValueId, INVALID_VALUE_ID, NULL_ROW_ID,
};
pub use value::Value;
