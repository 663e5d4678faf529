//! Error types for the wisp-denoise crate.

use wisp_wavelet::WaveletError;

/// Error type for all fallible operations in the wisp-denoise crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DenoiseError {
    /// Returned when the noise model cannot be estimated, e.g. when the
    /// reference shape cannot support the configured decomposition depth.
    #[error("noise estimation failed: {reason}")]
    NoiseEstimationFailed {
        /// Human-readable cause.
        reason: String,
    },

    /// Returned when the configured threshold factor is negative or
    /// non-finite.
    #[error("invalid threshold factor: {0}")]
    InvalidThreshold(f64),

    /// A transform-layer failure.
    #[error(transparent)]
    Wavelet(#[from] WaveletError),
}
