use strata_storage::StorageError;
use strata_types::{DataType, PredicateCondition};

use crate::operator::JoinMode;

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorError {
    /// Incompatible comparison operand types (a TEXT column can only be
    /// compared with another TEXT column).
    TypeMismatch { left: DataType, right: DataType },
    /// A between scan was asked for a condition outside the four between
    /// variants.
    UnreachablePredicate(PredicateCondition),
    /// A join was asked to evaluate a between condition.
    InvalidJoinPredicate(PredicateCondition),
    /// The nested-loop join does not serve this mode; Cross, Semi and Anti
    /// have dedicated operators.
    UnsupportedJoinMode(JoinMode),
    StorageError(StorageError),
}

impl std::fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorError::TypeMismatch { left, right } => {
                write!(f, "Cannot compare {} with {}", left, right)
            }
            ExecutorError::UnreachablePredicate(condition) => {
                write!(f, "'{}' is not a between condition", condition)
            }
            ExecutorError::InvalidJoinPredicate(condition) => {
                write!(f, "'{}' is not a binary join condition", condition)
            }
            ExecutorError::UnsupportedJoinMode(mode) => {
                write!(f, "Nested-loop join does not support {} mode", mode)
            }
            ExecutorError::StorageError(error) => write!(f, "Storage error: {}", error),
        }
    }
}

impl std::error::Error for ExecutorError {}

impl From<StorageError> for ExecutorError {
    fn from(error: StorageError) -> Self {
        ExecutorError::StorageError(error)
    }
}
