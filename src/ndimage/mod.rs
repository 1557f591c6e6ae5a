//! Image filtering: boundary-aware convolution and edge detection.
//!
//! # Algorithm: Direct Convolution
//!
//! ```text
//! convolve2d(src[H, W], kernel[Kh, Kw], size, boundary):
//!
//! 1. Output extents per axis:
//!    - full:  N + K - 1
//!    - same:  N
//!    - valid: N - K + 1   (error if <= 0)
//!
//! 2. Offset into full-convolution coordinates:
//!    - full: 0, same: (K - 1) / 2, valid: K - 1
//!
//! 3. For each output cell (i, j) at full position (i', j'):
//!    out[i, j] = sum_{u, v} src[b(i' - u), b(j' - v)] * kernel[u, v]
//!    where b() resolves out-of-range indices with the boundary mode
//!    (Zero skips the term).
//! ```
//!
//! All arithmetic is done in `f64`; results are cast back to the source dtype.

mod cpu;
mod helpers;

pub mod boundary;
pub mod sobel;
pub mod traits;
pub mod types;

pub(crate) use helpers::{
    from_f64_slice, to_f64_vec, validate_dtype, validate_non_empty, validate_rank,
};

pub use boundary::BoundaryMode;
pub use sobel::{Sobel, SobelOptions};
pub use traits::{ConvolutionAlgorithms, Convolver};
pub use types::SizeMode;
