//! Algorithm traits for image filtering.

pub mod convolution;

pub use convolution::{ConvolutionAlgorithms, Convolver};
