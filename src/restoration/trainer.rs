//! Trainer deriving a Wiener filter from the Fourier statistics of a dataset.
//!
//! Reference: R. Szeliski, "Computer Vision: Algorithms and Applications",
//! section 3.4.3.

use crate::compare::Similar;
use crate::error::RestoreResult;
use crate::restoration::machine::WienerMachine;
use crate::restoration::spectral::{NoiseModel, SpectralEstimator};
use crate::trainer::Trainer;
use log::debug;
use numr::runtime::cpu::CpuRuntime;
use numr::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// Sets a [`WienerMachine`] from the averaged power spectrum of a
/// [N, H, W] training stack.
///
/// The trainer keeps no learned state; training a machine again replaces
/// its filter entirely.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WienerTrainer {
    noise: NoiseModel,
}

impl WienerTrainer {
    pub fn new(noise: NoiseModel) -> Self {
        Self { noise }
    }

    pub fn noise_model(&self) -> NoiseModel {
        self.noise
    }
}

impl Trainer<WienerMachine, Tensor<CpuRuntime>> for WienerTrainer {
    fn train(&self, machine: &mut WienerMachine, data: &Tensor<CpuRuntime>) -> RestoreResult<()> {
        let stats = SpectralEstimator::new(self.noise).estimate(data)?;
        let (h, w) = stats.power.shape();
        debug!(
            "trained wiener filter on {} images of [{h}, {w}], noise power {:e}",
            stats.n_samples, stats.noise_power
        );
        machine.set_power_spectrum(stats.power, stats.noise_power)
    }
}

impl Similar for WienerTrainer {
    fn is_similar_to(&self, other: &Self, r_epsilon: f64, a_epsilon: f64) -> bool {
        self.noise.is_similar_to(&other.noise, r_epsilon, a_epsilon)
    }
}
