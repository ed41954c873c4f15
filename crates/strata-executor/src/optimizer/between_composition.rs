//! Between composition rule
//!
//! Walks the plan top-down looking for *predicate runs*: maximal chains of
//! predicate nodes where every node feeds exactly one consumer and has no
//! right input. Within a run, conjunctive comparison predicates on the same
//! column collapse into a single between-predicate with the tightest
//! bounds; everything else survives unchanged.
//!
//! A `col >= 10` chain node and a `col <= 20` chain node become one
//! `col BETWEEN 10 AND 20` node, which later scans serve with a single
//! pass. One-sided bounds and unrecognized predicates are re-emitted as
//! they were, so the rewrite never changes query semantics. Applying the
//! rule twice is a no-op: composed between-predicates pass through as
//! single expressions, not chains of boundaries.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use strata_types::{ColumnId, PredicateCondition, Value};

use crate::optimizer::expression::{Expression, LogicalOperator};
use crate::optimizer::plan::{PlanNode, PlanNodeKind};

pub struct BetweenCompositionRule;

/// Which side of a between a comparison contributes, and whether the bound
/// value itself is part of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundaryKind {
    LowerInclusive,
    LowerExclusive,
    UpperInclusive,
    UpperExclusive,
}

/// A normalized `column (bound-kind) value` fact extracted from one binary
/// comparison.
#[derive(Debug, Clone)]
struct ColumnBoundary {
    column_id: ColumnId,
    value: Value,
    kind: BoundaryKind,
}

/// How one chain predicate participates in the composition.
enum ChainPredicate {
    /// Contributes boundaries (a comparison, or an AND of comparisons).
    /// Comparison conjuncts without a boundary kind (`=`, `<>`) survive in
    /// `residue` as individual predicates.
    Boundaries { boundaries: Vec<ColumnBoundary>, residue: Vec<Expression> },
    /// An already-composed between-predicate; kept, ordered after the
    /// plain pass-throughs so re-running the rule reproduces its own
    /// output.
    Between(Expression),
    /// Anything else; kept unchanged.
    PassThrough(Expression),
}

impl BetweenCompositionRule {
    pub fn name(&self) -> &'static str {
        "BetweenCompositionRule"
    }

    /// Rewrite the plan rooted at `root`, returning the (possibly new)
    /// root. The input plan is not modified.
    pub fn apply_to(&self, root: &Arc<PlanNode>) -> Arc<PlanNode> {
        let consumer_counts = PlanNode::consumer_counts(root);
        let mut rewritten: HashMap<*const PlanNode, Arc<PlanNode>> = HashMap::new();
        self.rewrite(root, &consumer_counts, &mut rewritten)
    }

    fn rewrite(
        &self,
        node: &Arc<PlanNode>,
        consumer_counts: &HashMap<*const PlanNode, usize>,
        rewritten: &mut HashMap<*const PlanNode, Arc<PlanNode>>,
    ) -> Arc<PlanNode> {
        // Shared subplans rewrite once and stay shared
        if let Some(done) = rewritten.get(&Arc::as_ptr(node)) {
            return Arc::clone(done);
        }

        let chain = gather_predicate_chain(node, consumer_counts);
        let result = if chain.is_empty() {
            let left = node.left.as_ref().map(|child| self.rewrite(child, consumer_counts, rewritten));
            let right =
                node.right.as_ref().map(|child| self.rewrite(child, consumer_counts, rewritten));
            let unchanged = arc_eq(&left, &node.left) && arc_eq(&right, &node.right);
            if unchanged {
                Arc::clone(node)
            } else {
                node.shallow_copy(left, right)
            }
        } else {
            self.compose_chain(&chain, consumer_counts, rewritten)
        };

        rewritten.insert(Arc::as_ptr(node), Arc::clone(&result));
        result
    }

    /// Replace a predicate run with pass-throughs, re-emitted one-sided
    /// bounds and composed between-predicates, re-linked onto the chain's
    /// input.
    fn compose_chain(
        &self,
        chain: &[Arc<PlanNode>],
        consumer_counts: &HashMap<*const PlanNode, usize>,
        rewritten: &mut HashMap<*const PlanNode, Arc<PlanNode>>,
    ) -> Arc<PlanNode> {
        // Continue the rule below the chain first
        let chain_input = chain
            .last()
            .and_then(|node| node.left.as_ref())
            .map(|input| self.rewrite(input, consumer_counts, rewritten));

        let mut pass_through: Vec<Expression> = Vec::new();
        let mut between_pass_through: Vec<Expression> = Vec::new();
        // Grouped by column in first-appearance order
        let mut column_boundaries: IndexMap<ColumnId, Vec<ColumnBoundary>> = IndexMap::new();

        for node in chain {
            let Some(expression) = node.predicate_expression() else { continue };
            match classify_predicate(expression) {
                ChainPredicate::Boundaries { boundaries, residue } => {
                    for boundary in boundaries {
                        column_boundaries.entry(boundary.column_id).or_default().push(boundary);
                    }
                    pass_through.extend(residue);
                }
                ChainPredicate::Between(expression) => between_pass_through.push(expression),
                ChainPredicate::PassThrough(expression) => pass_through.push(expression),
            }
        }

        let mut reemitted: Vec<Expression> = Vec::new();
        let mut composed: Vec<Expression> = Vec::new();

        for (column_id, boundaries) in &column_boundaries {
            let mut lower: Option<(Value, bool)> = None;
            let mut upper: Option<(Value, bool)> = None;

            for boundary in boundaries {
                match boundary.kind {
                    // Keep the largest lower bound; on a tie the exclusive
                    // bound is stricter and wins
                    BoundaryKind::LowerInclusive => {
                        if replaces(&lower, &boundary.value, false) {
                            lower = Some((boundary.value.clone(), true));
                        }
                    }
                    BoundaryKind::LowerExclusive => {
                        if replaces(&lower, &boundary.value, true) {
                            lower = Some((boundary.value.clone(), false));
                        }
                    }
                    // Keep the smallest upper bound, same tie-break
                    BoundaryKind::UpperInclusive => {
                        if replaces_upper(&upper, &boundary.value, false) {
                            upper = Some((boundary.value.clone(), true));
                        }
                    }
                    BoundaryKind::UpperExclusive => {
                        if replaces_upper(&upper, &boundary.value, true) {
                            upper = Some((boundary.value.clone(), false));
                        }
                    }
                }
            }

            if let (Some((lower_value, lower_inclusive)), Some((upper_value, upper_inclusive))) =
                (lower, upper)
            {
                composed.push(Expression::between(
                    Expression::column(*column_id),
                    Expression::literal(lower_value),
                    Expression::literal(upper_value),
                    PredicateCondition::between_for(lower_inclusive, upper_inclusive),
                ));
            } else {
                // No two-sided range for this column; put every boundary
                // back as the comparison it came from
                for boundary in boundaries {
                    let condition = match boundary.kind {
                        BoundaryKind::LowerInclusive => PredicateCondition::GreaterThanEquals,
                        BoundaryKind::LowerExclusive => PredicateCondition::GreaterThan,
                        BoundaryKind::UpperInclusive => PredicateCondition::LessThanEquals,
                        BoundaryKind::UpperExclusive => PredicateCondition::LessThan,
                    };
                    reemitted.push(Expression::binary(
                        condition,
                        Expression::column(*column_id),
                        Expression::literal(boundary.value.clone()),
                    ));
                }
            }
        }

        // New chain, top to bottom: pass-throughs, re-emitted one-sided
        // bounds, then the between-predicates (pre-existing ones first)
        let mut expressions = pass_through;
        expressions.extend(reemitted);
        expressions.extend(between_pass_through);
        expressions.extend(composed);

        let mut current = chain_input;
        for expression in expressions.into_iter().rev() {
            current = Some(Arc::new(PlanNode {
                kind: PlanNodeKind::Predicate(expression),
                left: current,
                right: None,
            }));
        }
        // Every chain predicate contributes at least one expression
        current.expect("a predicate run never rewrites to an empty chain")
    }
}

fn arc_eq(a: &Option<Arc<PlanNode>>, b: &Option<Arc<PlanNode>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

/// Collect the maximal predicate run starting at `node`: consecutive
/// predicate nodes, each with a single consumer and no right input. Returns
/// an empty vector when `node` does not start a run.
fn gather_predicate_chain(
    node: &Arc<PlanNode>,
    consumer_counts: &HashMap<*const PlanNode, usize>,
) -> Vec<Arc<PlanNode>> {
    let mut chain = Vec::new();
    let mut current = Arc::clone(node);

    loop {
        if !current.is_predicate() {
            break;
        }
        // Once a node has multiple consumers, this is no longer a chain.
        // The root has no recorded consumers.
        if consumer_counts.get(&Arc::as_ptr(&current)).copied().unwrap_or(0) > 1 {
            break;
        }
        if current.right.is_some() {
            break;
        }
        chain.push(Arc::clone(&current));
        let Some(next) = current.left.clone() else { break };
        current = next;
    }
    chain
}

/// Whether a new lower-bound candidate replaces the best so far.
/// Inclusive candidates must be strictly larger; exclusive candidates also
/// replace on equality (ties flip to exclusive).
fn replaces(best: &Option<(Value, bool)>, candidate: &Value, replace_on_tie: bool) -> bool {
    match best {
        None => true,
        Some((best_value, _)) => match best_value.partial_cmp(candidate) {
            Some(std::cmp::Ordering::Less) => true,
            Some(std::cmp::Ordering::Equal) => replace_on_tie,
            _ => false,
        },
    }
}

/// Upper-bound counterpart of [`replaces`]: smaller wins, ties flip to
/// exclusive.
fn replaces_upper(best: &Option<(Value, bool)>, candidate: &Value, replace_on_tie: bool) -> bool {
    match best {
        None => true,
        Some((best_value, _)) => match best_value.partial_cmp(candidate) {
            Some(std::cmp::Ordering::Greater) => true,
            Some(std::cmp::Ordering::Equal) => replace_on_tie,
            _ => false,
        },
    }
}

/// Classify one chain predicate. An AND splits into its conjuncts only when
/// every conjunct is a binary comparison; otherwise dropping a conjunct
/// could change semantics, so the whole predicate passes through.
fn classify_predicate(expression: &Expression) -> ChainPredicate {
    match expression {
        Expression::Between { .. } => ChainPredicate::Between(expression.clone()),
        Expression::BinaryPredicate { .. } => match boundary_from_comparison(expression) {
            Some(boundary) => {
                ChainPredicate::Boundaries { boundaries: vec![boundary], residue: Vec::new() }
            }
            None => ChainPredicate::PassThrough(expression.clone()),
        },
        Expression::Logical { operator: LogicalOperator::And, .. } => {
            let conjuncts = expression.conjuncts();
            let all_comparisons = !conjuncts.is_empty()
                && conjuncts
                    .iter()
                    .all(|conjunct| matches!(conjunct, Expression::BinaryPredicate { .. }));
            if !all_comparisons {
                return ChainPredicate::PassThrough(expression.clone());
            }
            let mut boundaries = Vec::new();
            let mut residue = Vec::new();
            for conjunct in conjuncts {
                match boundary_from_comparison(conjunct) {
                    Some(boundary) => boundaries.push(boundary),
                    // `=` and `<>` conjuncts survive as their own predicates
                    None => residue.push(conjunct.clone()),
                }
            }
            if boundaries.is_empty() {
                ChainPredicate::PassThrough(expression.clone())
            } else {
                ChainPredicate::Boundaries { boundaries, residue }
            }
        }
        _ => ChainPredicate::PassThrough(expression.clone()),
    }
}

/// Derive a column boundary from `column op literal` or `literal op column`.
/// Equality and inequality comparisons have no boundary kind and return
/// `None`.
fn boundary_from_comparison(expression: &Expression) -> Option<ColumnBoundary> {
    let Expression::BinaryPredicate { condition, left, right } = expression else {
        return None;
    };

    // column op value
    if let (Expression::Column(column_id), Expression::Literal(value)) = (&**left, &**right) {
        let kind = match condition {
            PredicateCondition::GreaterThanEquals => BoundaryKind::LowerInclusive,
            PredicateCondition::GreaterThan => BoundaryKind::LowerExclusive,
            PredicateCondition::LessThanEquals => BoundaryKind::UpperInclusive,
            PredicateCondition::LessThan => BoundaryKind::UpperExclusive,
            _ => return None,
        };
        return Some(ColumnBoundary { column_id: *column_id, value: value.clone(), kind });
    }

    // value op column: the boundary sides swap
    if let (Expression::Literal(value), Expression::Column(column_id)) = (&**left, &**right) {
        let kind = match condition {
            PredicateCondition::LessThanEquals => BoundaryKind::LowerInclusive,
            PredicateCondition::LessThan => BoundaryKind::LowerExclusive,
            PredicateCondition::GreaterThanEquals => BoundaryKind::UpperInclusive,
            PredicateCondition::GreaterThan => BoundaryKind::UpperExclusive,
            _ => return None,
        };
        return Some(ColumnBoundary { column_id: *column_id, value: value.clone(), kind });
    }

    None
}
