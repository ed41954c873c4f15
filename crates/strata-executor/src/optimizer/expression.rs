//! Predicate expressions
//!
//! Sum-type expression nodes with owned children: column references,
//! literals, binary comparisons, AND/OR conjunctions and between-predicates.

use std::cmp::Ordering;

use strata_types::{ColumnId, PredicateCondition, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Column(ColumnId),
    Literal(Value),
    BinaryPredicate {
        condition: PredicateCondition,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Logical {
        operator: LogicalOperator,
        operands: Vec<Expression>,
    },
    Between {
        column: Box<Expression>,
        lower: Box<Expression>,
        upper: Box<Expression>,
        condition: PredicateCondition,
    },
}

impl Expression {
    pub fn column(column_id: ColumnId) -> Expression {
        Expression::Column(column_id)
    }

    pub fn literal(value: Value) -> Expression {
        Expression::Literal(value)
    }

    pub fn binary(condition: PredicateCondition, left: Expression, right: Expression) -> Expression {
        debug_assert!(!condition.is_between(), "use Expression::between for between conditions");
        Expression::BinaryPredicate { condition, left: Box::new(left), right: Box::new(right) }
    }

    pub fn and(operands: Vec<Expression>) -> Expression {
        Expression::Logical { operator: LogicalOperator::And, operands }
    }

    pub fn or(operands: Vec<Expression>) -> Expression {
        Expression::Logical { operator: LogicalOperator::Or, operands }
    }

    pub fn between(
        column: Expression,
        lower: Expression,
        upper: Expression,
        condition: PredicateCondition,
    ) -> Expression {
        debug_assert!(condition.is_between());
        Expression::Between {
            column: Box::new(column),
            lower: Box::new(lower),
            upper: Box::new(upper),
            condition,
        }
    }

    /// Greedily flatten nested ANDs into a conjunct list. Any expression
    /// that is not an AND is its own single conjunct.
    pub fn conjuncts(&self) -> Vec<&Expression> {
        match self {
            Expression::Logical { operator: LogicalOperator::And, operands } => {
                operands.iter().flat_map(Expression::conjuncts).collect()
            }
            other => vec![other],
        }
    }

    fn value_of(&self, row: &[Value]) -> Option<Value> {
        match self {
            Expression::Column(column_id) => row.get(*column_id as usize).cloned(),
            Expression::Literal(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Three-valued evaluation against one row. `Some(true)` keeps the row,
    /// `Some(false)` drops it, `None` is SQL UNKNOWN (which also drops it).
    pub fn evaluate(&self, row: &[Value]) -> Option<bool> {
        match self {
            Expression::BinaryPredicate { condition, left, right } => {
                let left = left.value_of(row)?;
                let right = right.value_of(row)?;
                if left.is_null() || right.is_null() {
                    return None;
                }
                let ordering = left.partial_cmp(&right)?;
                Some(condition.matches(ordering))
            }
            Expression::Between { column, lower, upper, condition } => {
                let value = column.value_of(row)?;
                let lower = lower.value_of(row)?;
                let upper = upper.value_of(row)?;
                if value.is_null() || lower.is_null() || upper.is_null() {
                    return None;
                }
                let lower_ordering = value.partial_cmp(&lower)?;
                let upper_ordering = value.partial_cmp(&upper)?;
                let above_lower = if condition.is_between_lower_inclusive() {
                    lower_ordering != Ordering::Less
                } else {
                    lower_ordering == Ordering::Greater
                };
                let below_upper = if condition.is_between_upper_inclusive() {
                    upper_ordering != Ordering::Greater
                } else {
                    upper_ordering == Ordering::Less
                };
                Some(above_lower && below_upper)
            }
            Expression::Logical { operator: LogicalOperator::And, operands } => {
                let mut unknown = false;
                for operand in operands {
                    match operand.evaluate(row) {
                        Some(false) => return Some(false),
                        None => unknown = true,
                        Some(true) => {}
                    }
                }
                if unknown {
                    None
                } else {
                    Some(true)
                }
            }
            Expression::Logical { operator: LogicalOperator::Or, operands } => {
                let mut unknown = false;
                for operand in operands {
                    match operand.evaluate(row) {
                        Some(true) => return Some(true),
                        None => unknown = true,
                        Some(false) => {}
                    }
                }
                if unknown {
                    None
                } else {
                    Some(false)
                }
            }
            // A bare column or literal is not a predicate
            Expression::Column(_) | Expression::Literal(_) => None,
        }
    }
}
