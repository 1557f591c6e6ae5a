//! Tolerance-based comparison shared by every configurable component.
//!
//! Two values `a` and `b` are considered close when
//!
//! ```text
//! |a - b| <= a_epsilon + r_epsilon * min(|a|, |b|)
//! ```
//!
//! The relative and absolute tolerances are independent: setting both to
//! zero reduces the check to exact equality, so `a == b` always implies
//! `a.is_similar_to(&b, 0.0, 0.0)`.

/// Default relative tolerance for [`Similar::is_similar_to`].
pub const DEFAULT_R_EPSILON: f64 = 1e-5;

/// Default absolute tolerance for [`Similar::is_similar_to`].
pub const DEFAULT_A_EPSILON: f64 = 1e-8;

/// Approximate equality with independent relative and absolute tolerances.
pub trait Similar {
    /// Returns true when `self` and `other` agree within the tolerances.
    fn is_similar_to(&self, other: &Self, r_epsilon: f64, a_epsilon: f64) -> bool;

    /// Same as [`is_similar_to`](Self::is_similar_to) with the default tolerances.
    fn is_similar(&self, other: &Self) -> bool {
        self.is_similar_to(other, DEFAULT_R_EPSILON, DEFAULT_A_EPSILON)
    }
}

/// Check two scalars for closeness.
#[inline]
pub fn is_close(a: f64, b: f64, r_epsilon: f64, a_epsilon: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= a_epsilon + r_epsilon * a.abs().min(b.abs())
}

/// Check two slices element-wise. Slices of different length are never close.
pub fn slices_close(a: &[f64], b: &[f64], r_epsilon: f64, a_epsilon: f64) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(&x, &y)| is_close(x, y, r_epsilon, a_epsilon))
}

impl Similar for f64 {
    fn is_similar_to(&self, other: &Self, r_epsilon: f64, a_epsilon: f64) -> bool {
        is_close(*self, *other, r_epsilon, a_epsilon)
    }
}

impl Similar for [f64] {
    fn is_similar_to(&self, other: &Self, r_epsilon: f64, a_epsilon: f64) -> bool {
        slices_close(self, other, r_epsilon, a_epsilon)
    }
}

impl Similar for Vec<f64> {
    fn is_similar_to(&self, other: &Self, r_epsilon: f64, a_epsilon: f64) -> bool {
        slices_close(self, other, r_epsilon, a_epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_values_are_close_with_zero_tolerance() {
        assert!(is_close(1.5, 1.5, 0.0, 0.0));
        assert!(!is_close(1.5, 1.5 + 1e-12, 0.0, 0.0));
    }

    #[test]
    fn test_absolute_tolerance() {
        assert!(is_close(0.0, 1e-9, 0.0, 1e-8));
        assert!(!is_close(0.0, 1e-7, 0.0, 1e-8));
    }

    #[test]
    fn test_relative_tolerance() {
        assert!(is_close(1000.0, 1000.001, 1e-5, 0.0));
        assert!(!is_close(1000.0, 1000.1, 1e-5, 0.0));
    }

    #[test]
    fn test_slices_close() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![1.0, 2.0 + 1e-10, 3.0];
        assert!(a.is_similar(&b));
        assert!(!a.is_similar_to(&b, 0.0, 0.0));
        assert!(!slices_close(&a, &a[..2], 1.0, 1.0));
    }
}
