//! Logical plan nodes
//!
//! Plans are immutable values: shared `Arc` nodes with up to two inputs and
//! no parent pointers. A node's consumers are not stored on the node;
//! rules that need them compute a consumer-count map from the root on
//! demand. Rewrites build new subtrees and leave the originals untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use strata_types::ColumnId;

use crate::operator::JoinMode;
use crate::optimizer::expression::Expression;

#[derive(Debug, Clone, PartialEq)]
pub enum PlanNodeKind {
    Predicate(Expression),
    Join { mode: JoinMode, condition: Option<Expression> },
    Projection(Vec<ColumnId>),
    Source(String),
}

#[derive(Debug, PartialEq)]
pub struct PlanNode {
    pub kind: PlanNodeKind,
    pub left: Option<Arc<PlanNode>>,
    pub right: Option<Arc<PlanNode>>,
}

impl PlanNode {
    pub fn source(name: impl Into<String>) -> Arc<PlanNode> {
        Arc::new(PlanNode { kind: PlanNodeKind::Source(name.into()), left: None, right: None })
    }

    pub fn predicate(expression: Expression, input: Arc<PlanNode>) -> Arc<PlanNode> {
        Arc::new(PlanNode {
            kind: PlanNodeKind::Predicate(expression),
            left: Some(input),
            right: None,
        })
    }

    pub fn projection(columns: Vec<ColumnId>, input: Arc<PlanNode>) -> Arc<PlanNode> {
        Arc::new(PlanNode {
            kind: PlanNodeKind::Projection(columns),
            left: Some(input),
            right: None,
        })
    }

    pub fn join(
        mode: JoinMode,
        condition: Option<Expression>,
        left: Arc<PlanNode>,
        right: Arc<PlanNode>,
    ) -> Arc<PlanNode> {
        Arc::new(PlanNode {
            kind: PlanNodeKind::Join { mode, condition },
            left: Some(left),
            right: Some(right),
        })
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self.kind, PlanNodeKind::Predicate(_))
    }

    pub fn predicate_expression(&self) -> Option<&Expression> {
        match &self.kind {
            PlanNodeKind::Predicate(expression) => Some(expression),
            _ => None,
        }
    }

    /// Same kind, different inputs (the optimizer's shallow copy).
    pub fn shallow_copy(
        &self,
        left: Option<Arc<PlanNode>>,
        right: Option<Arc<PlanNode>>,
    ) -> Arc<PlanNode> {
        Arc::new(PlanNode { kind: self.kind.clone(), left, right })
    }

    /// How many plan edges point at each node, keyed by node identity. The
    /// root has no entry. A node reachable through two parents (a shared
    /// subplan) counts one edge per parent.
    pub fn consumer_counts(root: &Arc<PlanNode>) -> HashMap<*const PlanNode, usize> {
        let mut counts: HashMap<*const PlanNode, usize> = HashMap::new();
        let mut visited: HashSet<*const PlanNode> = HashSet::new();
        let mut stack = vec![Arc::clone(root)];
        visited.insert(Arc::as_ptr(root));

        while let Some(node) = stack.pop() {
            for child in [node.left.as_ref(), node.right.as_ref()].into_iter().flatten() {
                *counts.entry(Arc::as_ptr(child)).or_insert(0) += 1;
                if visited.insert(Arc::as_ptr(child)) {
                    stack.push(Arc::clone(child));
                }
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::{PredicateCondition, Value};

    #[test]
    fn test_consumer_counts_linear_chain() {
        let source = PlanNode::source("t");
        let predicate = PlanNode::predicate(
            Expression::binary(
                PredicateCondition::Equals,
                Expression::column(0),
                Expression::literal(Value::Int(1)),
            ),
            Arc::clone(&source),
        );

        let counts = PlanNode::consumer_counts(&predicate);
        assert_eq!(counts.get(&Arc::as_ptr(&source)), Some(&1));
        assert_eq!(counts.get(&Arc::as_ptr(&predicate)), None);
    }

    #[test]
    fn test_consumer_counts_shared_subplan() {
        let source = PlanNode::source("t");
        let join = PlanNode::join(
            JoinMode::Inner,
            None,
            Arc::clone(&source),
            Arc::clone(&source),
        );

        let counts = PlanNode::consumer_counts(&join);
        assert_eq!(counts.get(&Arc::as_ptr(&source)), Some(&2));
    }
}
