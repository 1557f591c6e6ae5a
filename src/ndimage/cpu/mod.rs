//! CPU implementation of image filtering algorithms.
//!
//! Convolution runs directly in the spatial domain so that every
//! [`BoundaryMode`](crate::ndimage::BoundaryMode) can be honoured exactly.

mod convolution;
