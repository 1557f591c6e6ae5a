//! Second-order Fourier statistics of an image set.

use crate::compare::{Similar, is_close, slices_close};
use crate::error::{RestoreError, RestoreResult};
use crate::ndimage::{
    from_f64_slice, to_f64_vec, validate_dtype, validate_non_empty, validate_rank,
};
use crate::restoration::fft::Fft2;
use log::trace;
use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::runtime::cpu::CpuRuntime;
use numr::tensor::Tensor;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How the scalar noise power is obtained.
///
/// Noise power is expressed in the same units as [`PowerSpectrum`] values,
/// i.e. squared magnitudes of the unnormalized DFT. White noise of variance
/// `sigma^2` on an `H x W` image contributes `H * W * sigma^2` per bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoiseModel {
    /// Externally supplied noise power.
    Fixed(f64),

    /// Mean power over the high-frequency tail of the spectrum.
    ///
    /// A bin belongs to the tail when its normalized frequency radius
    /// `max(|fy|, |fx|) / 0.5` is at least `1 - fraction`, with `fy`, `fx`
    /// in cycles per sample. An empty tail yields zero noise.
    HighFrequencyTail { fraction: f64 },
}

impl Default for NoiseModel {
    fn default() -> Self {
        NoiseModel::Fixed(0.0)
    }
}

impl NoiseModel {
    pub fn validate(&self) -> RestoreResult<()> {
        match *self {
            NoiseModel::Fixed(power) if !power.is_finite() || power < 0.0 => {
                Err(RestoreError::InvalidParameter {
                    parameter: "noise_power".to_string(),
                    message: format!("must be finite and non-negative, got {power}"),
                })
            }
            NoiseModel::HighFrequencyTail { fraction } if !(fraction > 0.0 && fraction <= 1.0) => {
                Err(RestoreError::InvalidParameter {
                    parameter: "fraction".to_string(),
                    message: format!("must lie in (0, 1], got {fraction}"),
                })
            }
            _ => Ok(()),
        }
    }

    /// Noise power for a given averaged spectrum.
    pub fn estimate(&self, power: &PowerSpectrum) -> f64 {
        match *self {
            NoiseModel::Fixed(noise) => noise,
            NoiseModel::HighFrequencyTail { fraction } => {
                let threshold = 1.0 - fraction;
                let (h, w) = power.shape();
                let mut sum = 0.0;
                let mut count = 0usize;
                for ky in 0..h {
                    let fy = normalized_frequency(ky, h);
                    for kx in 0..w {
                        let fx = normalized_frequency(kx, w);
                        if fy.max(fx) >= threshold {
                            sum += power.values[ky * w + kx];
                            count += 1;
                        }
                    }
                }
                if count == 0 { 0.0 } else { sum / count as f64 }
            }
        }
    }
}

impl Similar for NoiseModel {
    fn is_similar_to(&self, other: &Self, r_epsilon: f64, a_epsilon: f64) -> bool {
        match (self, other) {
            (NoiseModel::Fixed(a), NoiseModel::Fixed(b)) => is_close(*a, *b, r_epsilon, a_epsilon),
            (
                NoiseModel::HighFrequencyTail { fraction: a },
                NoiseModel::HighFrequencyTail { fraction: b },
            ) => is_close(*a, *b, r_epsilon, a_epsilon),
            _ => false,
        }
    }
}

/// |frequency| of DFT bin `k` out of `n`, scaled so that Nyquist is 1.
fn normalized_frequency(k: usize, n: usize) -> f64 {
    let folded = k.min(n - k) as f64;
    2.0 * folded / n as f64
}

/// Averaged squared magnitude of the 2D DFT, one value per bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPowerSpectrum")]
pub struct PowerSpectrum {
    height: usize,
    width: usize,
    values: Vec<f64>,
}

/// Unchecked serialized form of [`PowerSpectrum`].
#[derive(Deserialize)]
struct RawPowerSpectrum {
    height: usize,
    width: usize,
    values: Vec<f64>,
}

impl TryFrom<RawPowerSpectrum> for PowerSpectrum {
    type Error = RestoreError;

    fn try_from(raw: RawPowerSpectrum) -> RestoreResult<Self> {
        Self::new(raw.height, raw.width, raw.values)
    }
}

impl PowerSpectrum {
    /// Wrap row-major values. Every value must be finite and non-negative.
    pub fn new(height: usize, width: usize, values: Vec<f64>) -> RestoreResult<Self> {
        validate_non_empty(&[height, width], "power spectrum")?;
        if values.len() != height * width {
            return Err(RestoreError::shape_mismatch(
                &[height, width],
                &[values.len()],
                "power spectrum values",
            ));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(RestoreError::InvalidParameter {
                parameter: "power".to_string(),
                message: format!("values must be finite and non-negative, got {bad}"),
            });
        }
        Ok(Self {
            height,
            width,
            values,
        })
    }

    /// Build from a 2D tensor.
    pub fn from_tensor(tensor: &Tensor<CpuRuntime>) -> RestoreResult<Self> {
        validate_rank(tensor, 2, "power spectrum")?;
        let shape = tensor.shape();
        Self::new(shape[0], shape[1], to_f64_vec(tensor, "power spectrum")?)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Power of bin `(ky, kx)`, or `None` outside the spectrum.
    pub fn get(&self, ky: usize, kx: usize) -> Option<f64> {
        if ky >= self.height || kx >= self.width {
            return None;
        }
        Some(self.values[ky * self.width + kx])
    }

    /// Copy to an `F64` tensor of shape [H, W].
    pub fn to_tensor(
        &self,
        device: &<CpuRuntime as Runtime>::Device,
    ) -> RestoreResult<Tensor<CpuRuntime>> {
        from_f64_slice(
            &self.values,
            &[self.height, self.width],
            DType::F64,
            device,
            "power spectrum",
        )
    }
}

impl Similar for PowerSpectrum {
    fn is_similar_to(&self, other: &Self, r_epsilon: f64, a_epsilon: f64) -> bool {
        self.shape() == other.shape()
            && slices_close(&self.values, &other.values, r_epsilon, a_epsilon)
    }
}

/// Output of [`SpectralEstimator::estimate`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralStatistics {
    /// Averaged power spectrum.
    pub power: PowerSpectrum,
    /// Scalar noise power in spectrum units.
    pub noise_power: f64,
    /// Number of images averaged.
    pub n_samples: usize,
}

/// Estimates the averaged power spectrum and noise power of an image stack.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpectralEstimator {
    noise: NoiseModel,
}

impl SpectralEstimator {
    pub fn new(noise: NoiseModel) -> Self {
        Self { noise }
    }

    pub fn noise_model(&self) -> NoiseModel {
        self.noise
    }

    /// Estimate statistics for a stack of shape [N, H, W].
    ///
    /// Slices are transformed in parallel and summed in index order, so the
    /// result is bit-for-bit reproducible.
    pub fn estimate(&self, stack: &Tensor<CpuRuntime>) -> RestoreResult<SpectralStatistics> {
        self.noise.validate()?;
        validate_rank(stack, 3, "spectral estimation stack")?;
        validate_dtype(stack.dtype(), "spectral estimation")?;
        validate_non_empty(stack.shape(), "spectral estimation stack")?;

        let (n, h, w) = (stack.shape()[0], stack.shape()[1], stack.shape()[2]);
        let data = to_f64_vec(stack, "spectral estimation")?;
        let fft = Fft2::new(h, w);

        trace!("estimating power spectrum over {n} images of [{h}, {w}]");
        let spectra: Vec<Vec<f64>> = data.par_chunks(h * w).map(|s| fft.power(s)).collect();

        let mut mean = vec![0.0f64; h * w];
        for spectrum in &spectra {
            for (acc, p) in mean.iter_mut().zip(spectrum) {
                *acc += p;
            }
        }
        let scale = 1.0 / n as f64;
        for v in mean.iter_mut() {
            *v *= scale;
        }

        let power = PowerSpectrum {
            height: h,
            width: w,
            values: mean,
        };
        let noise_power = self.noise.estimate(&power);
        trace!("noise power estimate {noise_power:e}");

        Ok(SpectralStatistics {
            power,
            noise_power,
            n_samples: n,
        })
    }
}

/// Power spectrum of a single image of shape [H, W].
pub fn power_spectrum(image: &Tensor<CpuRuntime>) -> RestoreResult<PowerSpectrum> {
    validate_rank(image, 2, "power spectrum image")?;
    validate_dtype(image.dtype(), "power spectrum")?;
    validate_non_empty(image.shape(), "power spectrum image")?;

    let (h, w) = (image.shape()[0], image.shape()[1]);
    let data = to_f64_vec(image, "power spectrum")?;
    Ok(PowerSpectrum {
        height: h,
        width: w,
        values: Fft2::new(h, w).power(&data),
    })
}
