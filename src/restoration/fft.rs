//! Two-dimensional complex FFT over row-major buffers.
//!
//! The forward transform is unnormalized; the inverse is scaled by
//! `1 / (H * W)` so that `inverse(forward(x)) == x`.

use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Planned 2D transform for a fixed `H x W` extent.
///
/// Plans are shared, so a single `Fft2` can be used from several threads.
pub(crate) struct Fft2 {
    height: usize,
    width: usize,
    row_forward: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl Fft2 {
    pub(crate) fn new(height: usize, width: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            height,
            width,
            row_forward: planner.plan_fft_forward(width),
            col_forward: planner.plan_fft_forward(height),
            row_inverse: planner.plan_fft_inverse(width),
            col_inverse: planner.plan_fft_inverse(height),
        }
    }

    /// Forward transform of a real image.
    pub(crate) fn forward_real(&self, image: &[f64]) -> Vec<Complex64> {
        let mut spectrum: Vec<Complex64> = image.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        self.forward(&mut spectrum);
        spectrum
    }

    /// In-place forward transform.
    pub(crate) fn forward(&self, data: &mut [Complex64]) {
        self.transform(data, &self.row_forward, &self.col_forward);
    }

    /// In-place inverse transform, normalized by `1 / (H * W)`.
    pub(crate) fn inverse(&self, data: &mut [Complex64]) {
        self.transform(data, &self.row_inverse, &self.col_inverse);
        let scale = 1.0 / (self.height * self.width) as f64;
        for v in data.iter_mut() {
            *v *= scale;
        }
    }

    /// Squared magnitude of the forward transform of a real image.
    pub(crate) fn power(&self, image: &[f64]) -> Vec<f64> {
        self.forward_real(image)
            .iter()
            .map(|c| c.norm_sqr())
            .collect()
    }

    fn transform(&self, data: &mut [Complex64], rows: &Arc<dyn Fft<f64>>, cols: &Arc<dyn Fft<f64>>) {
        debug_assert_eq!(data.len(), self.height * self.width);

        for row in data.chunks_exact_mut(self.width) {
            rows.process(row);
        }

        let mut column = vec![Complex64::new(0.0, 0.0); self.height];
        for j in 0..self.width {
            for (i, c) in column.iter_mut().enumerate() {
                *c = data[i * self.width + j];
            }
            cols.process(&mut column);
            for (i, c) in column.iter().enumerate() {
                data[i * self.width + j] = *c;
            }
        }
    }
}
