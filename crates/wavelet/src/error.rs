//! Error types for the wisp-wavelet crate.

/// Error type for all fallible operations in the wisp-wavelet crate.
///
/// Covers validation failures, shape problems, and cancellation of
/// in-flight transforms.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WaveletError {
    /// Returned when the requested decomposition level exceeds the maximum
    /// feasible for the signal length and filter.
    #[error("level too high: requested {requested}, max for length {len} is {max}")]
    InvalidLevel {
        /// Level that was requested.
        requested: usize,
        /// Maximum feasible level.
        max: usize,
        /// Length of the input signal.
        len: usize,
    },

    /// Returned when coefficient or signal shapes are inconsistent with
    /// the operation being performed.
    #[error("shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Expected length or extent.
        expected: usize,
        /// Length or extent actually provided.
        got: usize,
        /// Operation that detected the mismatch.
        context: &'static str,
    },

    /// Returned when an unsupported wavelet name is provided.
    #[error("unsupported wavelet: {0}")]
    UnknownWavelet(String),

    /// Returned when an unsupported boundary mode name is provided.
    #[error("unsupported boundary mode: {0}")]
    UnknownBoundary(String),

    /// Returned when an unsupported transform variant name is provided.
    #[error("unsupported transform variant: {0}")]
    UnknownVariant(String),

    /// Returned when the input signal or image is empty.
    #[error("input signal is empty")]
    EmptySignal,

    /// Returned when a transform is aborted through its cancel token.
    #[error("transform cancelled")]
    Cancelled,
}
