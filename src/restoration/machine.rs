//! Wiener machine: trained frequency-domain restoration filter.
//!
//! Holds the averaged signal power spectrum `S`, a scalar noise power `N` and
//! the derived per-bin gains
//!
//! ```text
//! G[k] = S[k] / (S[k] + N)      (0 where S[k] + N is numerically zero)
//! ```
//!
//! Applying the machine transforms the input with the same unnormalized 2D
//! DFT used for training, multiplies by `G`, inverts, and keeps the real part.

use crate::compare::{Similar, is_close, slices_close};
use crate::error::{RestoreError, RestoreResult};
use crate::ndimage::{from_f64_slice, to_f64_vec, validate_dtype, validate_rank};
use crate::restoration::fft::Fft2;
use crate::restoration::spectral::{NoiseModel, PowerSpectrum};
use log::debug;
use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::runtime::cpu::CpuRuntime;
use numr::tensor::Tensor;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Below this total power a bin is treated as empty and gets zero gain.
const ZERO_POWER: f64 = f64::MIN_POSITIVE;

/// Wiener gain for one frequency bin.
///
/// Always in `[0, 1]` for non-negative inputs, and exactly 0 when
/// `signal_power + noise_power` is numerically zero.
#[inline]
pub fn wiener_gain(signal_power: f64, noise_power: f64) -> f64 {
    let total = signal_power + noise_power;
    if total > ZERO_POWER {
        (signal_power / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWienerFilter")]
struct WienerFilter {
    power: PowerSpectrum,
    noise_power: f64,
    gains: Vec<f64>,
}

/// Unchecked serialized form of [`WienerFilter`].
#[derive(Deserialize)]
struct RawWienerFilter {
    power: PowerSpectrum,
    noise_power: f64,
    gains: Vec<f64>,
}

impl TryFrom<RawWienerFilter> for WienerFilter {
    type Error = RestoreError;

    fn try_from(raw: RawWienerFilter) -> RestoreResult<Self> {
        NoiseModel::Fixed(raw.noise_power).validate()?;
        let (h, w) = raw.power.shape();
        if raw.gains.len() != h * w {
            return Err(RestoreError::shape_mismatch(
                &[h, w],
                &[raw.gains.len()],
                "wiener filter gains",
            ));
        }
        validate_gains(&raw.gains)?;
        Ok(Self {
            power: raw.power,
            noise_power: raw.noise_power,
            gains: raw.gains,
        })
    }
}

fn validate_gains(gains: &[f64]) -> RestoreResult<()> {
    if gains.iter().any(|v| !v.is_finite()) {
        return Err(RestoreError::InvalidParameter {
            parameter: "gains".to_string(),
            message: "filter gains must be finite".to_string(),
        });
    }
    Ok(())
}

impl WienerFilter {
    fn new(power: PowerSpectrum, noise_power: f64) -> Self {
        let gains = power
            .values()
            .iter()
            .map(|&s| wiener_gain(s, noise_power))
            .collect();
        Self {
            power,
            noise_power,
            gains,
        }
    }
}

/// Frequency-domain Wiener filter. Untrained until a power spectrum is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WienerMachine {
    filter: Option<WienerFilter>,
}

impl WienerMachine {
    /// Create an untrained machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trained machine from a signal power spectrum and noise power.
    pub fn from_power_spectrum(power: PowerSpectrum, noise_power: f64) -> RestoreResult<Self> {
        let mut machine = Self::new();
        machine.set_power_spectrum(power, noise_power)?;
        Ok(machine)
    }

    pub fn is_trained(&self) -> bool {
        self.filter.is_some()
    }

    /// Extents [H, W] the filter was trained on.
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.filter.as_ref().map(|f| f.power.shape())
    }

    pub fn noise_power(&self) -> Option<f64> {
        self.filter.as_ref().map(|f| f.noise_power)
    }

    pub fn power_spectrum(&self) -> Option<&PowerSpectrum> {
        self.filter.as_ref().map(|f| &f.power)
    }

    /// Per-bin gains, row-major.
    pub fn gains(&self) -> Option<&[f64]> {
        self.filter.as_ref().map(|f| f.gains.as_slice())
    }

    /// Replace the trained state, recomputing every gain.
    pub fn set_power_spectrum(&mut self, power: PowerSpectrum, noise_power: f64) -> RestoreResult<()> {
        NoiseModel::Fixed(noise_power).validate()?;
        let (h, w) = power.shape();
        debug!("wiener machine set to [{h}, {w}] with noise power {noise_power:e}");
        self.filter = Some(WienerFilter::new(power, noise_power));
        Ok(())
    }

    /// Change the noise power and recompute the gains from the stored spectrum.
    ///
    /// Discards any gains installed with [`set_filter`](Self::set_filter).
    pub fn set_noise_power(&mut self, noise_power: f64) -> RestoreResult<()> {
        NoiseModel::Fixed(noise_power).validate()?;
        let filter = self.filter.as_mut().ok_or(RestoreError::Untrained)?;
        *filter = WienerFilter::new(filter.power.clone(), noise_power);
        Ok(())
    }

    /// Gains as an `F64` tensor of shape [H, W].
    pub fn filter(
        &self,
        device: &<CpuRuntime as Runtime>::Device,
    ) -> RestoreResult<Tensor<CpuRuntime>> {
        let filter = self.filter.as_ref().ok_or(RestoreError::Untrained)?;
        let (h, w) = filter.power.shape();
        from_f64_slice(&filter.gains, &[h, w], DType::F64, device, "wiener filter")
    }

    /// Overwrite the gains of a trained machine.
    ///
    /// The tensor must have the trained extents and finite values.
    pub fn set_filter(&mut self, gains: &Tensor<CpuRuntime>) -> RestoreResult<()> {
        let filter = self.filter.as_mut().ok_or(RestoreError::Untrained)?;
        let (h, w) = filter.power.shape();
        if gains.shape() != [h, w] {
            return Err(RestoreError::shape_mismatch(
                &[h, w],
                gains.shape(),
                "wiener filter gains",
            ));
        }
        let values = to_f64_vec(gains, "wiener filter")?;
        validate_gains(&values)?;
        filter.gains = values;
        Ok(())
    }

    /// Return to the untrained state.
    pub fn reset(&mut self) {
        self.filter = None;
    }

    /// Filter a 2D image with the trained gains.
    ///
    /// # Errors
    ///
    /// * `Untrained` if no filter is set
    /// * `ShapeMismatch` if the image is not 2D or its extents differ from
    ///   the training extents
    pub fn apply(&self, image: &Tensor<CpuRuntime>) -> RestoreResult<Tensor<CpuRuntime>> {
        let filter = self.filter.as_ref().ok_or(RestoreError::Untrained)?;
        validate_rank(image, 2, "wiener apply")?;
        validate_dtype(image.dtype(), "wiener apply")?;

        let (h, w) = filter.power.shape();
        if image.shape() != [h, w] {
            return Err(RestoreError::shape_mismatch(&[h, w], image.shape(), "wiener apply"));
        }

        let data = to_f64_vec(image, "wiener apply")?;
        let restored = filter_image(&Fft2::new(h, w), &filter.gains, &data);
        from_f64_slice(&restored, &[h, w], image.dtype(), image.device(), "wiener apply")
    }

    /// Filter every slice of a [N, H, W] stack.
    pub fn apply_stack(&self, stack: &Tensor<CpuRuntime>) -> RestoreResult<Tensor<CpuRuntime>> {
        let filter = self.filter.as_ref().ok_or(RestoreError::Untrained)?;
        validate_rank(stack, 3, "wiener apply_stack")?;
        validate_dtype(stack.dtype(), "wiener apply_stack")?;

        let (h, w) = filter.power.shape();
        if stack.shape()[1..] != [h, w] {
            return Err(RestoreError::shape_mismatch(
                &[stack.shape()[0], h, w],
                stack.shape(),
                "wiener apply_stack",
            ));
        }

        let data = to_f64_vec(stack, "wiener apply_stack")?;
        let fft = Fft2::new(h, w);
        let restored: Vec<f64> = data
            .par_chunks(h * w)
            .flat_map_iter(|slice| filter_image(&fft, &filter.gains, slice))
            .collect();
        from_f64_slice(
            &restored,
            stack.shape(),
            stack.dtype(),
            stack.device(),
            "wiener apply_stack",
        )
    }
}

fn filter_image(fft: &Fft2, gains: &[f64], image: &[f64]) -> Vec<f64> {
    let mut spectrum = fft.forward_real(image);
    for (c, &g) in spectrum.iter_mut().zip(gains) {
        *c *= g;
    }
    fft.inverse(&mut spectrum);
    spectrum.iter().map(|c| c.re).collect()
}

impl Similar for WienerMachine {
    fn is_similar_to(&self, other: &Self, r_epsilon: f64, a_epsilon: f64) -> bool {
        match (&self.filter, &other.filter) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.power.is_similar_to(&b.power, r_epsilon, a_epsilon)
                    && is_close(a.noise_power, b.noise_power, r_epsilon, a_epsilon)
                    && slices_close(&a.gains, &b.gains, r_epsilon, a_epsilon)
            }
            _ => false,
        }
    }
}
