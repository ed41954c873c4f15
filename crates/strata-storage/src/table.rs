//! Tables: a schema plus an append-only sequence of chunks
//!
//! A Data table owns its row data in value or dictionary segments. A
//! References table is the virtual output of a scan or join: every segment
//! is a reference segment into some Data table.
//!
//! Chunks are append-only; they are never reordered or deleted at this
//! layer. Concurrent appenders serialize through the append mutex. Readers
//! iterate chunks by index without locking as long as they bound iteration
//! by a previously observed `chunk_count()`: the chunk sequence only grows,
//! and a chunk that a reader still holds is copied on write rather than
//! mutated under it.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use strata_types::{ChunkId, ColumnId, DataType, Value};

use crate::chunk::{Chunk, MvccData};
use crate::error::StorageError;
use crate::segment::Segment;

/// Chunk capacity used when the caller does not pick one.
pub const DEFAULT_MAX_CHUNK_SIZE: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableType {
    Data,
    References,
}

/// Whether a table keeps per-row MVCC slots alongside its chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseMvcc {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        ColumnDefinition { name: name.into(), data_type, nullable }
    }
}

#[derive(Debug)]
pub struct Table {
    column_definitions: Vec<ColumnDefinition>,
    table_type: TableType,
    use_mvcc: UseMvcc,
    max_chunk_size: u32,
    chunks: Vec<Arc<Chunk>>,
    append_mutex: Mutex<()>,
}

impl Table {
    pub fn new(
        column_definitions: Vec<ColumnDefinition>,
        table_type: TableType,
        max_chunk_size: u32,
        use_mvcc: UseMvcc,
    ) -> Self {
        assert!(max_chunk_size > 0, "Table must have a chunk size greater than 0");
        Table {
            column_definitions,
            table_type,
            use_mvcc,
            max_chunk_size,
            chunks: Vec::new(),
            append_mutex: Mutex::new(()),
        }
    }

    /// An empty Data table with the given schema. Reference segments of
    /// all-NULL position lists point here when their input had no chunks.
    pub fn create_dummy_table(column_definitions: Vec<ColumnDefinition>) -> Arc<Table> {
        Arc::new(Table::new(
            column_definitions,
            TableType::Data,
            DEFAULT_MAX_CHUNK_SIZE,
            UseMvcc::No,
        ))
    }

    pub fn column_definitions(&self) -> &[ColumnDefinition] {
        &self.column_definitions
    }

    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    pub fn has_mvcc(&self) -> bool {
        self.use_mvcc == UseMvcc::Yes
    }

    pub fn column_count(&self) -> usize {
        self.column_definitions.len()
    }

    pub fn column_name(&self, column_id: ColumnId) -> Result<&str, StorageError> {
        self.column_definitions
            .get(column_id as usize)
            .map(|definition| definition.name.as_str())
            .ok_or(StorageError::ColumnIndexOutOfBounds { index: column_id })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.column_definitions.iter().map(|definition| definition.name.as_str()).collect()
    }

    pub fn column_data_type(&self, column_id: ColumnId) -> Result<DataType, StorageError> {
        self.column_definitions
            .get(column_id as usize)
            .map(|definition| definition.data_type)
            .ok_or(StorageError::ColumnIndexOutOfBounds { index: column_id })
    }

    pub fn column_data_types(&self) -> Vec<DataType> {
        self.column_definitions.iter().map(|definition| definition.data_type).collect()
    }

    pub fn column_is_nullable(&self, column_id: ColumnId) -> Result<bool, StorageError> {
        self.column_definitions
            .get(column_id as usize)
            .map(|definition| definition.nullable)
            .ok_or(StorageError::ColumnIndexOutOfBounds { index: column_id })
    }

    pub fn columns_are_nullable(&self) -> Vec<bool> {
        self.column_definitions.iter().map(|definition| definition.nullable).collect()
    }

    pub fn column_id_by_name(&self, name: &str) -> Result<ColumnId, StorageError> {
        self.column_definitions
            .iter()
            .position(|definition| definition.name == name)
            .map(|index| index as ColumnId)
            .ok_or_else(|| StorageError::ColumnNotFound { name: name.to_string() })
    }

    pub fn max_chunk_size(&self) -> u32 {
        self.max_chunk_size
    }

    pub fn chunk_count(&self) -> ChunkId {
        self.chunks.len() as ChunkId
    }

    pub fn get_chunk(&self, chunk_id: ChunkId) -> Result<&Arc<Chunk>, StorageError> {
        self.chunks
            .get(chunk_id as usize)
            .ok_or(StorageError::ChunkIndexOutOfBounds { index: chunk_id })
    }

    pub fn chunks(&self) -> &[Arc<Chunk>] {
        &self.chunks
    }

    pub fn row_count(&self) -> u64 {
        self.chunks.iter().map(|chunk| u64::from(chunk.size())).sum()
    }

    pub fn empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Serializes appenders that share this table across handles. `append`
    /// itself requires `&mut self`, which already excludes concurrent
    /// appends through one handle.
    pub fn acquire_append_mutex(&self) -> MutexGuard<'_, ()> {
        self.append_mutex.lock()
    }

    /// Append one row. The row must match the schema in arity, types and
    /// nullability. Opens a fresh mutable chunk when the last one is full.
    pub fn append(&mut self, values: Vec<Value>) -> Result<(), StorageError> {
        if values.len() != self.column_definitions.len() {
            return Err(StorageError::ColumnCountMismatch {
                expected: self.column_definitions.len(),
                actual: values.len(),
            });
        }
        for (definition, value) in self.column_definitions.iter().zip(&values) {
            if value.is_null() {
                if !definition.nullable {
                    return Err(StorageError::NullConstraintViolation {
                        column: definition.name.clone(),
                    });
                }
            } else if !value.matches_data_type(definition.data_type) {
                return Err(StorageError::TypeMismatch {
                    column: definition.name.clone(),
                    expected: definition.data_type,
                    // value is non-null here, so it has a data type
                    actual: value.data_type().unwrap_or(definition.data_type),
                });
            }
        }

        let needs_chunk = self
            .chunks
            .last()
            .map_or(true, |chunk| chunk.size() >= self.max_chunk_size);
        if needs_chunk {
            self.append_mutable_chunk()?;
        }

        // A reader may still hold the chunk; copy-on-write instead of
        // mutating under it
        let chunk = self.chunks.last_mut().expect("a mutable chunk was just ensured");
        Arc::make_mut(chunk).append(&values)
    }

    /// Open a new empty chunk of value segments matching the schema.
    pub fn append_mutable_chunk(&mut self) -> Result<(), StorageError> {
        if self.table_type != TableType::Data {
            return Err(StorageError::SegmentKindMismatch { table_type: self.table_type });
        }
        let segments = self
            .column_definitions
            .iter()
            .map(|definition| Segment::new_value_segment(definition.data_type, definition.nullable))
            .collect();
        let mvcc = self.has_mvcc().then(|| MvccData::new(0));
        self.chunks.push(Arc::new(Chunk::new(segments, mvcc)));
        Ok(())
    }

    /// Append a pre-built chunk. Segment count, sizes, data types and
    /// segment kinds must all agree with the table.
    pub fn append_chunk(&mut self, segments: Vec<Segment>) -> Result<(), StorageError> {
        if segments.len() != self.column_definitions.len() {
            return Err(StorageError::ColumnCountMismatch {
                expected: self.column_definitions.len(),
                actual: segments.len(),
            });
        }

        let chunk_size = segments.first().map_or(0, Segment::size);
        for (definition, segment) in self.column_definitions.iter().zip(&segments) {
            if segment.size() != chunk_size {
                return Err(StorageError::ChunkSizeMismatch {
                    expected: chunk_size,
                    actual: segment.size(),
                });
            }
            if segment.is_reference() != (self.table_type == TableType::References) {
                return Err(StorageError::SegmentKindMismatch { table_type: self.table_type });
            }
            if segment.data_type() != definition.data_type {
                return Err(StorageError::TypeMismatch {
                    column: definition.name.clone(),
                    expected: definition.data_type,
                    actual: segment.data_type(),
                });
            }
        }

        let mvcc = self.has_mvcc().then(|| MvccData::new(chunk_size as usize));
        self.chunks.push(Arc::new(Chunk::new(segments, mvcc)));
        Ok(())
    }

    pub fn estimate_memory_usage(&self) -> usize {
        let chunks: usize = self.chunks.iter().map(|chunk| chunk.estimate_memory_usage()).sum();
        let names: usize = self.column_definitions.iter().map(|definition| definition.name.len()).sum();
        std::mem::size_of::<Self>() + chunks + names
    }
}
