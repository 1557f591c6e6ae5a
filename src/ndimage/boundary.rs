//! Boundary extension policy for convolution.

use serde::{Deserialize, Serialize};

/// Boundary handling mode.
///
/// Determines how values outside the source extents are synthesized when a
/// kernel overlaps the border. Illustrated on a row `a b c d`:
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoundaryMode {
    /// Zero padding: 0 0 | a b c d | 0 0
    Zero,
    /// Nearest edge value: a a | a b c d | d d
    NearestNeighbour,
    /// Wrap (periodic): c d | a b c d | a b
    Circular,
    /// Half-sample symmetric: b a | a b c d | d c
    ///
    /// Index -1 maps to 0, -2 to 1 and `n` to `n - 1`.
    #[default]
    Mirror,
}

impl BoundaryMode {
    /// Map `index` onto `[0, extent)`.
    ///
    /// Returns `None` when the sample lies outside and the mode is [`Zero`],
    /// meaning the contribution must be skipped. `extent` must be non-zero.
    ///
    /// [`Zero`]: BoundaryMode::Zero
    #[inline]
    pub fn resolve(self, index: isize, extent: usize) -> Option<usize> {
        let n = extent as isize;
        if (0..n).contains(&index) {
            return Some(index as usize);
        }
        match self {
            BoundaryMode::Zero => None,
            BoundaryMode::NearestNeighbour => Some(index.clamp(0, n - 1) as usize),
            BoundaryMode::Circular => Some(index.rem_euclid(n) as usize),
            BoundaryMode::Mirror => {
                let period = 2 * n;
                let pos = index.rem_euclid(period);
                Some(if pos < n { pos } else { period - 1 - pos } as usize)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_untouched() {
        for mode in [
            BoundaryMode::Zero,
            BoundaryMode::NearestNeighbour,
            BoundaryMode::Circular,
            BoundaryMode::Mirror,
        ] {
            for i in 0..4 {
                assert_eq!(mode.resolve(i, 4), Some(i as usize));
            }
        }
    }

    #[test]
    fn test_zero_skips() {
        assert_eq!(BoundaryMode::Zero.resolve(-1, 4), None);
        assert_eq!(BoundaryMode::Zero.resolve(4, 4), None);
    }

    #[test]
    fn test_nearest_clamps() {
        assert_eq!(BoundaryMode::NearestNeighbour.resolve(-3, 4), Some(0));
        assert_eq!(BoundaryMode::NearestNeighbour.resolve(9, 4), Some(3));
    }

    #[test]
    fn test_circular_wraps() {
        assert_eq!(BoundaryMode::Circular.resolve(-1, 4), Some(3));
        assert_eq!(BoundaryMode::Circular.resolve(4, 4), Some(0));
        assert_eq!(BoundaryMode::Circular.resolve(-9, 4), Some(3));
    }

    #[test]
    fn test_mirror_convention() {
        let m = BoundaryMode::Mirror;
        assert_eq!(m.resolve(-1, 4), Some(0));
        assert_eq!(m.resolve(-2, 4), Some(1));
        assert_eq!(m.resolve(4, 4), Some(3));
        assert_eq!(m.resolve(5, 4), Some(2));
        // Beyond one reflection: d c b a | a b c d | d c b a | a ...
        assert_eq!(m.resolve(8, 4), Some(0));
        assert_eq!(m.resolve(-5, 4), Some(3));
    }

    #[test]
    fn test_single_sample_extent() {
        for mode in [
            BoundaryMode::NearestNeighbour,
            BoundaryMode::Circular,
            BoundaryMode::Mirror,
        ] {
            assert_eq!(mode.resolve(-2, 1), Some(0));
            assert_eq!(mode.resolve(3, 1), Some(0));
        }
    }
}
