//! Table wrapper operator
//!
//! Wraps an existing table so it can feed an operator DAG as a leaf.

use std::sync::Arc;

use strata_storage::Table;

use crate::errors::ExecutorError;
use crate::operator::Operator;

pub struct TableWrapper {
    table: Arc<Table>,
}

impl TableWrapper {
    pub fn new(table: Arc<Table>) -> Self {
        TableWrapper { table }
    }
}

impl Operator for TableWrapper {
    fn name(&self) -> &'static str {
        "TableWrapper"
    }

    fn execute(&self) -> Result<Arc<Table>, ExecutorError> {
        Ok(Arc::clone(&self.table))
    }

    fn left_input(&self) -> Option<Arc<dyn Operator>> {
        None
    }

    fn right_input(&self) -> Option<Arc<dyn Operator>> {
        None
    }

    fn deep_copy_with_inputs(
        &self,
        _copied_left: Option<Arc<dyn Operator>>,
        _copied_right: Option<Arc<dyn Operator>>,
    ) -> Arc<dyn Operator> {
        Arc::new(TableWrapper { table: Arc::clone(&self.table) })
    }
}
