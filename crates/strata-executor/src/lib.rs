//! Executor - Query Execution Engine
//!
//! This crate provides the physical operators of the engine (table scan and
//! nested-loop join over chunked columnar tables) and the logical-plan
//! optimizer pass that fuses predicate chains into between-predicates.

pub mod errors;
pub mod operator;
pub mod optimizer;
mod profiling;

pub use errors::ExecutorError;
pub use operator::join_nested_loop::JoinNestedLoop;
pub use operator::table_scan::ColumnBetweenScan;
pub use operator::table_wrapper::TableWrapper;
pub use operator::{JoinMode, Operator, ParameterId};
pub use optimizer::between_composition::BetweenCompositionRule;
pub use optimizer::expression::{Expression, LogicalOperator};
pub use optimizer::plan::{PlanNode, PlanNodeKind};
