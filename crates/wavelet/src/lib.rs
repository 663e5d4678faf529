//! # wisp-wavelet
//!
//! Multiresolution wavelet transforms over 1-D signals and 2-D images.
//!
//! ## Analysis Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["Wavelet::from_name(name)?"] --> B["TransformConfig::new(wavelet)"]
//!     B -->|"decompose(&signal, &config, None)?"| C["Decomposition"]
//!     C -->|"reconstruct(&dec, &config, None)?"| D["Vec&lt;f64&gt;"]
//!     B -->|"decompose2(&image, &config, None)?"| E["Decomposition2"]
//!     E --> F[".planes()"]
//!     E -->|"reconstruct2(&dec, &config, None)?"| G["Array2&lt;f64&gt;"]
//! ```
//!
//! ## Transform Variants
//!
//! | Variant | Sampling | Detail planes per 2-D level |
//! |---------|----------|-----------------------------|
//! | [`TransformVariant::Decimated`] | critical | 3 directional |
//! | [`TransformVariant::Undecimated`] | redundant | 3 directional |
//! | [`TransformVariant::IsotropicUndecimated`] | redundant | 1 planar |
//! | [`TransformVariant::PyramidDifference`] | redundant | 1 planar |
//!
//! ## Quick Start
//!
//! ```ignore
//! use wisp_wavelet::{decompose, reconstruct, TransformConfig, Wavelet};
//!
//! let config = TransformConfig::new(Wavelet::from_name("db2")?).with_levels(3);
//! let dec = decompose(&signal, &config, None)?;
//! let restored = reconstruct(&dec, &config, None)?;
//! ```

mod boundary;
mod convolve;
mod error;
mod filter;
mod resample;
mod transform;
mod variant;

pub use boundary::{extend, extend_axis, BoundaryMode};
pub use convolve::{convolve, convolve2d, convolve_axis, ConvMode};
pub use error::WaveletError;
pub use filter::Wavelet;
pub use resample::{dilate, downsample, downsample_axis, upsample, upsample_axis};
pub use transform::{
    decompose, decompose2, reconstruct, reconstruct2, CancelToken, Decomposition, Decomposition2,
    DetailBands, TransformConfig,
};
pub use variant::TransformVariant;
