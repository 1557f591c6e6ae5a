//! Image restoration with trained Wiener filters.
//!
//! # Algorithm
//!
//! ```text
//! train(stack[N, H, W]):
//!   S[k] = (1/N) * sum_n |FFT2(stack[n])[k]|^2
//!   N    = noise model (fixed scalar or high-frequency tail mean of S)
//!   G[k] = S[k] / (S[k] + N)           (0 if S[k] + N == 0)
//!
//! apply(image[H, W]):
//!   real(IFFT2(FFT2(image) * G))
//! ```
//!
//! The FFT is a CPU transform (`rustfft`) over `f64`; inputs of any
//! supported dtype are widened before transforming and cast back afterwards.

mod fft;

pub mod machine;
pub mod spectral;
pub mod trainer;

pub use machine::{WienerMachine, wiener_gain};
pub use spectral::{NoiseModel, PowerSpectrum, SpectralEstimator, SpectralStatistics, power_spectrum};
pub use trainer::WienerTrainer;
