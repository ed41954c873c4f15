//! Predicate conditions

use std::cmp::Ordering;

/// The condition attached to a predicate: six binary comparisons plus the
/// four between variants (one per inclusivity pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateCondition {
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    BetweenInclusive,
    BetweenLowerExclusive,
    BetweenUpperExclusive,
    BetweenExclusive,
}

impl PredicateCondition {
    /// Flip the condition as if the operands swapped sides
    /// (`<` becomes `>`, `<=` becomes `>=`; equality is symmetric).
    ///
    /// Between variants have no operand sides to swap and are unchanged.
    pub fn flip(&self) -> PredicateCondition {
        match self {
            PredicateCondition::LessThan => PredicateCondition::GreaterThan,
            PredicateCondition::LessThanEquals => PredicateCondition::GreaterThanEquals,
            PredicateCondition::GreaterThan => PredicateCondition::LessThan,
            PredicateCondition::GreaterThanEquals => PredicateCondition::LessThanEquals,
            other => *other,
        }
    }

    /// Whether this is one of the four between variants.
    pub fn is_between(&self) -> bool {
        matches!(
            self,
            PredicateCondition::BetweenInclusive
                | PredicateCondition::BetweenLowerExclusive
                | PredicateCondition::BetweenUpperExclusive
                | PredicateCondition::BetweenExclusive
        )
    }

    /// Whether a between variant includes its lower bound.
    pub fn is_between_lower_inclusive(&self) -> bool {
        matches!(
            self,
            PredicateCondition::BetweenInclusive | PredicateCondition::BetweenUpperExclusive
        )
    }

    /// Whether a between variant includes its upper bound.
    pub fn is_between_upper_inclusive(&self) -> bool {
        matches!(
            self,
            PredicateCondition::BetweenInclusive | PredicateCondition::BetweenLowerExclusive
        )
    }

    /// The between variant for an inclusivity pair.
    pub fn between_for(lower_inclusive: bool, upper_inclusive: bool) -> PredicateCondition {
        match (lower_inclusive, upper_inclusive) {
            (true, true) => PredicateCondition::BetweenInclusive,
            (false, true) => PredicateCondition::BetweenLowerExclusive,
            (true, false) => PredicateCondition::BetweenUpperExclusive,
            (false, false) => PredicateCondition::BetweenExclusive,
        }
    }

    /// Whether an ordering between two non-null operands satisfies a binary
    /// comparison condition. Between variants never match here; they are
    /// evaluated against a bound pair, not a single ordering.
    #[inline]
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            PredicateCondition::Equals => ordering == Ordering::Equal,
            PredicateCondition::NotEquals => ordering != Ordering::Equal,
            PredicateCondition::LessThan => ordering == Ordering::Less,
            PredicateCondition::LessThanEquals => ordering != Ordering::Greater,
            PredicateCondition::GreaterThan => ordering == Ordering::Greater,
            PredicateCondition::GreaterThanEquals => ordering != Ordering::Less,
            _ => false,
        }
    }
}

impl std::fmt::Display for PredicateCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredicateCondition::Equals => write!(f, "="),
            PredicateCondition::NotEquals => write!(f, "<>"),
            PredicateCondition::LessThan => write!(f, "<"),
            PredicateCondition::LessThanEquals => write!(f, "<="),
            PredicateCondition::GreaterThan => write!(f, ">"),
            PredicateCondition::GreaterThanEquals => write!(f, ">="),
            PredicateCondition::BetweenInclusive => write!(f, "BETWEEN INCLUSIVE"),
            PredicateCondition::BetweenLowerExclusive => write!(f, "BETWEEN LOWER EXCLUSIVE"),
            PredicateCondition::BetweenUpperExclusive => write!(f, "BETWEEN UPPER EXCLUSIVE"),
            PredicateCondition::BetweenExclusive => write!(f, "BETWEEN EXCLUSIVE"),
        }
    }
}
