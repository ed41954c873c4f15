//! Storage - In-Memory Columnar Storage
//!
//! This crate provides the chunked columnar data model of the engine:
//!
//! - **Segments**: one column's storage within one chunk. Value segments
//!   hold a dense typed vector with an optional null bitmap, dictionary
//!   segments hold a sorted unique dictionary plus per-row codes, and
//!   reference segments point through a position list into another table.
//! - **Chunks**: a horizontal fixed-width slice of rows across all columns.
//! - **Tables**: a column schema plus an append-only sequence of chunks,
//!   classified as Data (owns its segments) or References (every segment is
//!   a reference segment).
//! - **Iteration substrate**: a uniform way to walk segment positions, with
//!   typed (monomorphized) and erased (boxed) dispatch shapes and an
//!   optional position filter for selective scans.

pub mod chunk;
pub mod error;
pub mod pos_list;
pub mod segment;
pub mod table;

pub use chunk::{Chunk, MvccData};
pub use error::StorageError;
pub use pos_list::PosList;
pub use segment::iterate::{
    DictionaryCodeIter, DictionarySegmentIter, SegmentPosition, ValueSegmentIter,
};
pub use segment::{
    erased_positions_owned, DictionarySegment, ReferenceSegment, Segment, SegmentType,
    TypedSegment, ValueSegment,
};
pub use table::{ColumnDefinition, Table, TableType, UseMvcc, DEFAULT_MAX_CHUNK_SIZE};
