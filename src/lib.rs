//! imgrestore - Classical image restoration and edge detection on numr tensors
//!
//! imgrestore provides the numeric core for two families of operations:
//!
//! - **Filtering**: direct 2D convolution with explicit output sizing
//!   ([`SizeMode`]) and boundary extension ([`BoundaryMode`]), and the
//!   [`Sobel`] gradient operator built on it.
//! - **Restoration**: a [`WienerTrainer`] that learns per-frequency gains from
//!   the averaged power spectrum of a training stack and stores them in a
//!   [`WienerMachine`], which then filters new images.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐      ┌─────────────────────────────────┐
//! │ ndimage                  │      │ restoration                     │
//! │  BoundaryMode, SizeMode  │      │  SpectralEstimator ─► S, N      │
//! │  ConvolutionAlgorithms   │      │  WienerTrainer ─► WienerMachine │
//! │  Sobel                   │      │  WienerMachine::apply           │
//! └────────────┬─────────────┘      └───────────────┬─────────────────┘
//!              │ uses                               │ uses
//! ┌────────────▼────────────────────────────────────▼───────────────┐
//! │ numr tensors (CpuRuntime)          rustfft (2D spectra)          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use imgrestore::{Sobel, Trainer, WienerMachine, WienerTrainer};
//! use numr::runtime::cpu::{CpuClient, CpuDevice};
//! use numr::tensor::Tensor;
//!
//! let device = CpuDevice::new();
//! let client = CpuClient::new(device.clone());
//!
//! let image = Tensor::from_slice(&[1.0f64; 25], &[5, 5], &device);
//! let gradients = Sobel::default().apply(&client, &image)?; // [2, 5, 5]
//!
//! let stack = Tensor::from_slice(&[1.0f64; 75], &[3, 5, 5], &device);
//! let mut machine = WienerMachine::new();
//! WienerTrainer::default().train(&mut machine, &stack)?;
//! let restored = machine.apply(&image)?;
//! ```

pub mod compare;
pub mod error;
pub mod ndimage;
pub mod restoration;
pub mod sink;
pub mod trainer;

pub use compare::Similar;
pub use error::{RestoreError, RestoreResult};
pub use ndimage::{BoundaryMode, ConvolutionAlgorithms, Convolver, SizeMode, Sobel, SobelOptions};
pub use restoration::{
    NoiseModel, PowerSpectrum, SpectralEstimator, SpectralStatistics, WienerMachine,
    WienerTrainer,
};
pub use sink::CallbackSink;
pub use trainer::Trainer;

// Re-export numr types that users will commonly need
pub use numr::dtype::DType;
pub use numr::tensor::Tensor;
