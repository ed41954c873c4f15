//! Physical operators
//!
//! Operators consume tables and produce tables. Inputs are other operators;
//! a driver executes the DAG by calling `execute` on the root, and every
//! operator computes its output exactly once (later calls return the cached
//! table). Scans and joins emit References tables whose segments reuse the
//! input's data segments through shared position lists.

pub mod join_nested_loop;
pub mod reference_writer;
pub mod table_scan;
pub mod table_wrapper;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use strata_storage::Table;
use strata_types::Value;

use crate::errors::ExecutorError;

/// Identifies a placeholder in a prepared plan.
pub type ParameterId = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinMode {
    Inner,
    Left,
    Right,
    Outer,
    Cross,
    Semi,
    Anti,
}

impl std::fmt::Display for JoinMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinMode::Inner => write!(f, "INNER"),
            JoinMode::Left => write!(f, "LEFT OUTER"),
            JoinMode::Right => write!(f, "RIGHT OUTER"),
            JoinMode::Outer => write!(f, "FULL OUTER"),
            JoinMode::Cross => write!(f, "CROSS"),
            JoinMode::Semi => write!(f, "SEMI"),
            JoinMode::Anti => write!(f, "ANTI"),
        }
    }
}

pub trait Operator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce this operator's output table, executing inputs as needed.
    /// The result is computed once; repeated calls return the same table.
    fn execute(&self) -> Result<Arc<Table>, ExecutorError>;

    fn left_input(&self) -> Option<Arc<dyn Operator>>;

    fn right_input(&self) -> Option<Arc<dyn Operator>>;

    /// Recreate this operator over the given (already copied) inputs, with
    /// a fresh output cache.
    fn deep_copy_with_inputs(
        &self,
        copied_left: Option<Arc<dyn Operator>>,
        copied_right: Option<Arc<dyn Operator>>,
    ) -> Arc<dyn Operator>;

    /// Recursively copy this operator and everything below it.
    fn deep_copy(&self) -> Arc<dyn Operator> {
        let copied_left = self.left_input().map(|input| input.deep_copy());
        let copied_right = self.right_input().map(|input| input.deep_copy());
        self.deep_copy_with_inputs(copied_left, copied_right)
    }

    /// Bind placeholder values. The operators in this crate take no
    /// parameters; prepared-statement style operators override this.
    fn set_parameters(&self, _parameters: &HashMap<ParameterId, Value>) {}
}

/// One-shot output slot shared by all operators.
pub(crate) struct OutputCache {
    output: OnceLock<Arc<Table>>,
}

impl OutputCache {
    pub(crate) fn new() -> Self {
        OutputCache { output: OnceLock::new() }
    }

    /// Return the cached output or compute it, timing the computation under
    /// the operator's name (see [`crate::profiling`]). Errors are not
    /// cached; a failed operator fails again on the next call.
    pub(crate) fn get_or_compute<F>(
        &self,
        operator_name: &'static str,
        compute: F,
    ) -> Result<Arc<Table>, ExecutorError>
    where
        F: FnOnce() -> Result<Arc<Table>, ExecutorError>,
    {
        if let Some(table) = self.output.get() {
            return Ok(Arc::clone(table));
        }
        let table = crate::profiling::time_operator(operator_name, compute)?;
        let _ = self.output.set(Arc::clone(&table));
        Ok(table)
    }
}
