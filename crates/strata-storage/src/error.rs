// ============================================================================
// Errors
// ============================================================================

use strata_types::{ChunkId, ColumnId, DataType};

use crate::table::TableType;

#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    ColumnCountMismatch { expected: usize, actual: usize },
    ColumnIndexOutOfBounds { index: ColumnId },
    ChunkIndexOutOfBounds { index: ChunkId },
    ColumnNotFound { name: String },
    TypeMismatch { column: String, expected: DataType, actual: DataType },
    NullConstraintViolation { column: String },
    // Segment-level variants without table context
    DataTypeMismatch { expected: DataType, actual: DataType },
    NullValueNotAllowed,
    SegmentNotAppendable,
    SegmentKindMismatch { table_type: TableType },
    ChunkSizeMismatch { expected: u32, actual: u32 },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::ColumnCountMismatch { expected, actual } => {
                write!(f, "Column count mismatch: expected {}, got {}", expected, actual)
            }
            StorageError::ColumnIndexOutOfBounds { index } => {
                write!(f, "Column index {} out of bounds", index)
            }
            StorageError::ChunkIndexOutOfBounds { index } => {
                write!(f, "Chunk index {} out of bounds", index)
            }
            StorageError::ColumnNotFound { name } => write!(f, "Column '{}' not found", name),
            StorageError::TypeMismatch { column, expected, actual } => {
                write!(
                    f,
                    "Type mismatch in column '{}': expected {}, got {}",
                    column, expected, actual
                )
            }
            StorageError::NullConstraintViolation { column } => {
                write!(f, "Column '{}' is not nullable and cannot store NULL", column)
            }
            StorageError::DataTypeMismatch { expected, actual } => {
                write!(f, "Segment data type mismatch: expected {}, got {}", expected, actual)
            }
            StorageError::NullValueNotAllowed => {
                write!(f, "Segment has no null bitmap and cannot store NULL")
            }
            StorageError::SegmentNotAppendable => {
                write!(f, "Only value segments support appending")
            }
            StorageError::SegmentKindMismatch { table_type } => match table_type {
                TableType::Data => {
                    write!(f, "Data tables cannot hold reference segments")
                }
                TableType::References => {
                    write!(f, "References tables can only hold reference segments")
                }
            },
            StorageError::ChunkSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Segments within a chunk must have the same length: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for StorageError {}
