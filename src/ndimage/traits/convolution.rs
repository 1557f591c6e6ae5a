//! Boundary-aware convolution algorithm traits.

use crate::error::RestoreResult;
use crate::ndimage::boundary::BoundaryMode;
use crate::ndimage::types::SizeMode;
use numr::runtime::Runtime;
use numr::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// Algorithmic contract for direct (spatial domain) convolution.
///
/// Unlike FFT convolution, which implicitly zero-pads, these operations
/// synthesize out-of-range samples with a [`BoundaryMode`]. Accumulation is
/// always performed in `f64`, and the result has the dtype of `signal`.
pub trait ConvolutionAlgorithms<R: Runtime> {
    /// 1D convolution.
    ///
    /// # Arguments
    ///
    /// * `signal` - Input tensor of shape [N]
    /// * `kernel` - Kernel tensor of shape [M]
    /// * `size` - Output extents (Full, Same, Valid)
    /// * `boundary` - Extension policy for samples outside the signal
    fn convolve(
        &self,
        signal: &Tensor<R>,
        kernel: &Tensor<R>,
        size: SizeMode,
        boundary: BoundaryMode,
    ) -> RestoreResult<Tensor<R>>;

    /// 2D convolution.
    ///
    /// Computes `out[i, j] = sum_{u,v} src[b(i' - u), b(j' - v)] * kernel[u, v]`
    /// where `(i', j')` is the output position in full-convolution
    /// coordinates and `b` is the boundary policy.
    ///
    /// # Arguments
    ///
    /// * `signal` - Input tensor of shape [H, W]
    /// * `kernel` - Kernel tensor of shape [Kh, Kw]
    /// * `size` - Output extents (Full, Same, Valid)
    /// * `boundary` - Extension policy for samples outside the signal
    ///
    /// # Errors
    ///
    /// * `ShapeMismatch` if either input is not 2D
    /// * `InvalidShape` if an input axis is empty or `Valid` output would be empty
    fn convolve2d(
        &self,
        signal: &Tensor<R>,
        kernel: &Tensor<R>,
        size: SizeMode,
        boundary: BoundaryMode,
    ) -> RestoreResult<Tensor<R>>;

    /// 2D cross-correlation
    ///
    /// `correlate2d(x, k) = convolve2d(x, flip(k))` with `k` flipped on both axes.
    fn correlate2d(
        &self,
        signal: &Tensor<R>,
        kernel: &Tensor<R>,
        size: SizeMode,
        boundary: BoundaryMode,
    ) -> RestoreResult<Tensor<R>>;
}

/// Convolution engine with fixed size and boundary modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Convolver {
    size: SizeMode,
    boundary: BoundaryMode,
}

impl Convolver {
    pub fn new(size: SizeMode, boundary: BoundaryMode) -> Self {
        Self { size, boundary }
    }

    pub fn size_mode(&self) -> SizeMode {
        self.size
    }

    pub fn boundary_mode(&self) -> BoundaryMode {
        self.boundary
    }

    /// 1D convolution with this engine's modes.
    pub fn convolve<R, C>(
        &self,
        client: &C,
        signal: &Tensor<R>,
        kernel: &Tensor<R>,
    ) -> RestoreResult<Tensor<R>>
    where
        R: Runtime,
        C: ConvolutionAlgorithms<R>,
    {
        client.convolve(signal, kernel, self.size, self.boundary)
    }

    /// 2D convolution with this engine's modes.
    pub fn convolve2d<R, C>(
        &self,
        client: &C,
        signal: &Tensor<R>,
        kernel: &Tensor<R>,
    ) -> RestoreResult<Tensor<R>>
    where
        R: Runtime,
        C: ConvolutionAlgorithms<R>,
    {
        client.convolve2d(signal, kernel, self.size, self.boundary)
    }

    /// 2D cross-correlation with this engine's modes.
    pub fn correlate2d<R, C>(
        &self,
        client: &C,
        signal: &Tensor<R>,
        kernel: &Tensor<R>,
    ) -> RestoreResult<Tensor<R>>
    where
        R: Runtime,
        C: ConvolutionAlgorithms<R>,
    {
        client.correlate2d(signal, kernel, self.size, self.boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};

    #[test]
    fn test_convolver_uses_fixed_modes() {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        let signal = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);
        let kernel = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 1.0], &[1, 2], &device);

        let engine = Convolver::new(SizeMode::Full, BoundaryMode::Zero);
        assert_eq!(engine.size_mode(), SizeMode::Full);
        assert_eq!(engine.boundary_mode(), BoundaryMode::Zero);

        let out = engine.convolve2d(&client, &signal, &kernel).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out.to_vec::<f64>(), vec![1.0, 3.0, 2.0, 3.0, 7.0, 4.0]);

        let direct = client
            .convolve2d(&signal, &kernel, SizeMode::Full, BoundaryMode::Zero)
            .unwrap();
        assert_eq!(out.to_vec::<f64>(), direct.to_vec::<f64>());
    }

    #[test]
    fn test_default_engine() {
        let engine = Convolver::default();
        assert_eq!(engine.size_mode(), SizeMode::Same);
        assert_eq!(engine.boundary_mode(), BoundaryMode::Mirror);
    }
}
