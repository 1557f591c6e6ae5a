//! Output sizing for boundary-aware convolution.

use crate::error::{RestoreError, RestoreResult};
use serde::{Deserialize, Serialize};

/// Convolution output size mode.
///
/// Determines the extents of the output and how it is aligned relative to
/// the full convolution result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SizeMode {
    /// Full convolution output
    ///
    /// Output length = N + M - 1, where N = signal length, M = kernel length.
    /// Every position where the kernel and the signal overlap.
    Full,

    /// Same-size output
    ///
    /// Output length = N. The output is centered on the full result, with the
    /// kernel origin at `(M - 1) / 2`.
    #[default]
    Same,

    /// Valid convolution output
    ///
    /// Output length = N - M + 1. Only positions where the kernel fits
    /// entirely within the signal; the boundary mode is never consulted.
    Valid,
}

impl SizeMode {
    /// Output length along one axis, or `None` if it would be empty.
    pub fn output_len(&self, signal_len: usize, kernel_len: usize) -> Option<usize> {
        if signal_len == 0 || kernel_len == 0 {
            return None;
        }
        match self {
            SizeMode::Full => Some(signal_len + kernel_len - 1),
            SizeMode::Same => Some(signal_len),
            SizeMode::Valid => (signal_len >= kernel_len).then(|| signal_len - kernel_len + 1),
        }
    }

    /// Offset of output index 0 within the full convolution result.
    pub fn slice_start(&self, kernel_len: usize) -> usize {
        match self {
            SizeMode::Full => 0,
            SizeMode::Same => (kernel_len - 1) / 2,
            SizeMode::Valid => kernel_len - 1,
        }
    }

    /// Output shape for an N-D convolution, failing with `InvalidShape`
    /// when any axis would be empty.
    pub fn output_shape(&self, signal: &[usize], kernel: &[usize]) -> RestoreResult<Vec<usize>> {
        signal
            .iter()
            .zip(kernel)
            .map(|(&n, &m)| self.output_len(n, m))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                RestoreError::invalid_shape(
                    signal,
                    &format!("{self:?} convolution with kernel {kernel:?}"),
                )
            })
    }
}
