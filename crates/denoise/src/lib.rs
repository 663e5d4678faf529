//! # wisp-denoise
//!
//! Wavelet threshold denoising on top of `wisp-wavelet`.
//!
//! ## Pipeline
//!
//! 1. **Sigma** — caller-provided, or k-sigma clipping estimate
//! 2. **Noise model** — per-plane response of the transform to unit noise
//! 3. **Decompose** — multiresolution transform of the input
//! 4. **Threshold** — hard or soft shrinkage of every detail plane at
//!    `threshold_factor * sigma * model[plane]`
//! 5. **Reconstruct** — inverse transform, approximation untouched
//!
//! ## Quick Start
//!
//! ```ignore
//! use wisp_denoise::{denoise, DenoiseConfig};
//! use wisp_wavelet::Wavelet;
//!
//! let config = DenoiseConfig::new(Wavelet::from_name("db2")?).with_levels(3);
//! let cleaned = denoise(&image, None, &config, None)?;
//! ```

mod denoise;
mod error;
mod noise;

pub use denoise::{denoise, denoise_signal, DenoiseConfig, ThresholdMode};
pub use error::DenoiseError;
pub use noise::{gaussian_noise, gaussian_noise_1d, k_sigma_noise_estimation, NoiseModel};

// Re-export the transform types callers need to configure a run.
pub use wisp_wavelet::{BoundaryMode, CancelToken, TransformVariant, Wavelet};
