//! Logical-plan optimizer
//!
//! Plans are immutable trees of shared nodes; a rewrite rule builds a new
//! plan rather than mutating links. The only rule at this layer composes
//! chains of conjunctive comparison predicates into between-predicates.

pub mod between_composition;
pub mod expression;
pub mod plan;
