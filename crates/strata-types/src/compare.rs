//! Cross-type comparison rules
//!
//! Comparators in scan and join loops run on concrete element types. When the
//! two sides of a join have different numeric types, the comparison promotes
//! both operands to a common type first: integer pairs widen to `i64`, any
//! pair involving a float widens to `f64`. Strings only compare with strings;
//! there is deliberately no impl mixing TEXT with a numeric type, so that a
//! mixed comparison is a compile error rather than a silent mismatch.

use std::cmp::Ordering;

/// Comparison between two (possibly different) element types.
pub trait CompareWith<Rhs: ?Sized> {
    /// Compare two non-null operands. `None` only occurs for NaN.
    fn compare_with(&self, other: &Rhs) -> Option<Ordering>;
}

macro_rules! numeric_compare_impl {
    ($lhs:ty, $rhs:ty => $wide:ty) => {
        impl CompareWith<$rhs> for $lhs {
            #[inline]
            fn compare_with(&self, other: &$rhs) -> Option<Ordering> {
                (*self as $wide).partial_cmp(&(*other as $wide))
            }
        }
    };
}

// Integer pairs widen to i64
numeric_compare_impl!(i32, i32 => i64);
numeric_compare_impl!(i32, i64 => i64);
numeric_compare_impl!(i64, i32 => i64);
numeric_compare_impl!(i64, i64 => i64);

// Anything involving a float widens to f64
numeric_compare_impl!(i32, f32 => f64);
numeric_compare_impl!(i32, f64 => f64);
numeric_compare_impl!(i64, f32 => f64);
numeric_compare_impl!(i64, f64 => f64);
numeric_compare_impl!(f32, i32 => f64);
numeric_compare_impl!(f32, i64 => f64);
numeric_compare_impl!(f32, f32 => f64);
numeric_compare_impl!(f32, f64 => f64);
numeric_compare_impl!(f64, i32 => f64);
numeric_compare_impl!(f64, i64 => f64);
numeric_compare_impl!(f64, f32 => f64);
numeric_compare_impl!(f64, f64 => f64);

impl CompareWith<String> for String {
    #[inline]
    fn compare_with(&self, other: &String) -> Option<Ordering> {
        self.partial_cmp(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_pairs_widen() {
        assert_eq!(5i32.compare_with(&5i64), Some(Ordering::Equal));
        assert_eq!(i64::from(i32::MAX).compare_with(&i32::MAX), Some(Ordering::Equal));
        assert_eq!((-1i32).compare_with(&1i64), Some(Ordering::Less));
    }

    #[test]
    fn test_float_pairs_widen() {
        assert_eq!(1i32.compare_with(&1.0f64), Some(Ordering::Equal));
        assert_eq!(1.5f32.compare_with(&1i64), Some(Ordering::Greater));
    }

    #[test]
    fn test_nan_is_incomparable() {
        assert_eq!(f64::NAN.compare_with(&1.0f64), None);
    }
}
