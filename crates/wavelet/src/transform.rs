//! Multilevel decomposition and reconstruction drivers.

use crate::boundary::BoundaryMode;
use crate::convolve::{convolve_axis, ConvMode};
use crate::error::WaveletError;
use crate::filter::Wavelet;
use crate::variant::TransformVariant;
use ndarray::{s, Array2, Axis};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Cooperative cancellation handle for in-flight transforms.
///
/// Cheap to clone and share across threads; the drivers check it between
/// levels, never mid-level, so a cancelled transform returns
/// [`WaveletError::Cancelled`] without ever exposing a truncated
/// coefficient set.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Takes effect at the next level boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

fn check_cancelled(cancel: Option<&CancelToken>) -> Result<(), WaveletError> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(WaveletError::Cancelled),
        _ => Ok(()),
    }
}

/// Configuration for a multilevel transform.
///
/// Use the builder methods to customize the scheme; every value is resolved
/// and immutable by the time a transform runs.
///
/// # Example
///
/// ```ignore
/// use wisp_wavelet::{BoundaryMode, TransformConfig, TransformVariant, Wavelet};
///
/// let config = TransformConfig::new(Wavelet::from_name("db2")?)
///     .with_variant(TransformVariant::Undecimated)
///     .with_boundary(BoundaryMode::Periodic)
///     .with_levels(3);
/// ```
#[derive(Clone, Debug)]
pub struct TransformConfig {
    wavelet: Wavelet,
    boundary: BoundaryMode,
    variant: TransformVariant,
    n_levels: usize,
}

impl TransformConfig {
    /// Creates a configuration with defaults: decimated variant, symmetric
    /// boundary, one level.
    pub fn new(wavelet: Wavelet) -> Self {
        Self {
            wavelet,
            boundary: BoundaryMode::Symmetric,
            variant: TransformVariant::Decimated,
            n_levels: 1,
        }
    }

    /// Sets the boundary handling mode.
    pub fn with_boundary(mut self, boundary: BoundaryMode) -> Self {
        self.boundary = boundary;
        self
    }

    /// Sets the transform variant.
    pub fn with_variant(mut self, variant: TransformVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the number of decomposition levels.
    pub fn with_levels(mut self, n_levels: usize) -> Self {
        self.n_levels = n_levels;
        self
    }

    /// Returns the wavelet filter bundle.
    pub fn wavelet(&self) -> &Wavelet {
        &self.wavelet
    }

    /// Returns the boundary mode.
    pub fn boundary(&self) -> BoundaryMode {
        self.boundary
    }

    /// Returns the transform variant.
    pub fn variant(&self) -> TransformVariant {
        self.variant
    }

    /// Returns the number of decomposition levels.
    pub fn n_levels(&self) -> usize {
        self.n_levels
    }
}

/// Result of a multilevel 1-D decomposition.
///
/// Detail bands are stored finest first (the order the cascade produces
/// them); the final coarse approximation is kept separately, along with the
/// original signal length used to trim the decimated odd-length artifact on
/// reconstruction.
#[derive(Clone, Debug)]
pub struct Decomposition {
    details: Vec<Vec<f64>>,
    approx: Vec<f64>,
    signal_len: usize,
}

impl Decomposition {
    /// Returns the number of detail levels.
    pub fn n_levels(&self) -> usize {
        self.details.len()
    }

    /// Returns the detail band at the given level, finest first.
    ///
    /// Returns `None` if the level is out of range.
    pub fn detail(&self, level: usize) -> Option<&[f64]> {
        self.details.get(level).map(|v| v.as_slice())
    }

    /// Returns all detail bands, finest first.
    pub fn details(&self) -> impl Iterator<Item = &[f64]> {
        self.details.iter().map(|v| v.as_slice())
    }

    /// Returns the final coarse approximation.
    pub fn approx(&self) -> &[f64] {
        &self.approx
    }

    /// Returns the length of the signal that was decomposed.
    pub fn signal_len(&self) -> usize {
        self.signal_len
    }

    /// Returns a copy with every detail band replaced by `f(level, band)`.
    ///
    /// The approximation is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::ShapeMismatch`] if `f` changes a band's
    /// length.
    pub fn map_details<F>(&self, mut f: F) -> Result<Self, WaveletError>
    where
        F: FnMut(usize, &[f64]) -> Vec<f64>,
    {
        let mut details = Vec::with_capacity(self.details.len());
        for (level, band) in self.details.iter().enumerate() {
            let mapped = f(level, band);
            if mapped.len() != band.len() {
                return Err(WaveletError::ShapeMismatch {
                    expected: band.len(),
                    got: mapped.len(),
                    context: "detail band map",
                });
            }
            details.push(mapped);
        }
        Ok(Self {
            details,
            approx: self.approx.clone(),
            signal_len: self.signal_len,
        })
    }
}

/// Detail bands of one 2-D decomposition level.
#[derive(Clone, Debug)]
pub enum DetailBands {
    /// Single residual plane of the additive schemes.
    Planar(Array2<f64>),
    /// Directional planes of the separable filter-bank schemes.
    Directional {
        /// Lowpass along rows, highpass along columns.
        horizontal: Array2<f64>,
        /// Highpass along rows, lowpass along columns.
        vertical: Array2<f64>,
        /// Highpass along both axes.
        diagonal: Array2<f64>,
    },
}

impl DetailBands {
    /// Returns the planes of this level in storage order: planar, or
    /// horizontal, vertical, diagonal.
    pub fn planes(&self) -> impl Iterator<Item = &Array2<f64>> {
        let slots: [Option<&Array2<f64>>; 3] = match self {
            Self::Planar(p) => [Some(p), None, None],
            Self::Directional {
                horizontal,
                vertical,
                diagonal,
            } => [Some(horizontal), Some(vertical), Some(diagonal)],
        };
        slots.into_iter().flatten()
    }

    /// Returns the number of planes (1 or 3).
    pub fn n_planes(&self) -> usize {
        match self {
            Self::Planar(_) => 1,
            Self::Directional { .. } => 3,
        }
    }

    fn map<F>(&self, mut f: F) -> Result<Self, WaveletError>
    where
        F: FnMut(&Array2<f64>) -> Array2<f64>,
    {
        let mut apply = |p: &Array2<f64>| -> Result<Array2<f64>, WaveletError> {
            let mapped = f(p);
            if mapped.dim() != p.dim() {
                return Err(WaveletError::ShapeMismatch {
                    expected: p.len(),
                    got: mapped.len(),
                    context: "detail plane map",
                });
            }
            Ok(mapped)
        };
        Ok(match self {
            Self::Planar(p) => Self::Planar(apply(p)?),
            Self::Directional {
                horizontal,
                vertical,
                diagonal,
            } => Self::Directional {
                horizontal: apply(horizontal)?,
                vertical: apply(vertical)?,
                diagonal: apply(diagonal)?,
            },
        })
    }
}

/// Result of a multilevel 2-D decomposition.
///
/// Levels are stored finest first; plane order within the decomposition is
/// level-major ([`DetailBands::planes`] order within a level).
#[derive(Clone, Debug)]
pub struct Decomposition2 {
    details: Vec<DetailBands>,
    approx: Array2<f64>,
    shape: (usize, usize),
}

impl Decomposition2 {
    /// Returns the number of detail levels.
    pub fn n_levels(&self) -> usize {
        self.details.len()
    }

    /// Returns the detail bands at the given level, finest first.
    pub fn detail(&self, level: usize) -> Option<&DetailBands> {
        self.details.get(level)
    }

    /// Returns the final coarse approximation plane.
    pub fn approx(&self) -> &Array2<f64> {
        &self.approx
    }

    /// Returns the shape of the image that was decomposed.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Returns all detail planes in decomposition order (finest level
    /// first, planes in [`DetailBands::planes`] order within a level).
    pub fn planes(&self) -> impl Iterator<Item = &Array2<f64>> {
        self.details.iter().flat_map(|bands| bands.planes())
    }

    /// Returns the total number of detail planes.
    pub fn n_planes(&self) -> usize {
        self.details.iter().map(|b| b.n_planes()).sum()
    }

    /// Returns a copy with every detail plane replaced by
    /// `f(plane_index, plane)`, where `plane_index` follows
    /// [`Decomposition2::planes`] order. The approximation is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::ShapeMismatch`] if `f` changes a plane's
    /// shape.
    pub fn map_planes<F>(&self, mut f: F) -> Result<Self, WaveletError>
    where
        F: FnMut(usize, &Array2<f64>) -> Array2<f64>,
    {
        let mut index = 0;
        let mut details = Vec::with_capacity(self.details.len());
        for bands in &self.details {
            let mapped = bands.map(|p| {
                let out = f(index, p);
                index += 1;
                out
            })?;
            details.push(mapped);
        }
        Ok(Self {
            details,
            approx: self.approx.clone(),
            shape: self.shape,
        })
    }
}

/// Validates the requested depth against the variant's feasible maximum.
fn validate_levels(
    n: usize,
    config: &TransformConfig,
) -> Result<(), WaveletError> {
    let max = config.variant().max_level(n, config.wavelet().len());
    if config.n_levels() > max {
        return Err(WaveletError::InvalidLevel {
            requested: config.n_levels(),
            max,
            len: n,
        });
    }
    Ok(())
}

/// Decomposes a 1-D signal into `config.n_levels()` detail bands plus a
/// coarse approximation.
///
/// The cancel token, when provided, is checked between levels.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`WaveletError::EmptySignal`] | empty input |
/// | [`WaveletError::InvalidLevel`] | requested depth exceeds the feasible maximum |
/// | [`WaveletError::Cancelled`] | token cancelled at a level boundary |
pub fn decompose(
    signal: &[f64],
    config: &TransformConfig,
    cancel: Option<&CancelToken>,
) -> Result<Decomposition, WaveletError> {
    let n = signal.len();
    if n == 0 {
        return Err(WaveletError::EmptySignal);
    }
    validate_levels(n, config)?;
    debug!(
        n,
        levels = config.n_levels(),
        wavelet = config.wavelet().name(),
        variant = ?config.variant(),
        "decomposing signal"
    );

    let mut details = Vec::with_capacity(config.n_levels());
    let mut approx = signal.to_vec();
    for level in 0..config.n_levels() {
        check_cancelled(cancel)?;
        let (a, d) =
            config
                .variant()
                .decompose_level(&approx, config.wavelet(), config.boundary(), level)?;
        details.push(d);
        approx = a;
    }
    Ok(Decomposition {
        details,
        approx,
        signal_len: n,
    })
}

/// Reconstructs a 1-D signal from its decomposition.
///
/// Walks the detail bands coarsest first, applying the variant's mirror
/// step, then trims the decimated odd-length artifact sample against the
/// recorded signal length.
///
/// # Errors
///
/// Returns [`WaveletError::ShapeMismatch`] when the bands could not have
/// come from a matching decomposition, and [`WaveletError::Cancelled`] at
/// level boundaries.
pub fn reconstruct(
    decomposition: &Decomposition,
    config: &TransformConfig,
    cancel: Option<&CancelToken>,
) -> Result<Vec<f64>, WaveletError> {
    let mut approx = decomposition.approx.clone();
    for (level, detail) in decomposition.details.iter().enumerate().rev() {
        check_cancelled(cancel)?;
        approx = config
            .variant()
            .reconstruct_level(&approx, detail, config.wavelet(), level)?;
    }
    let n = decomposition.signal_len;
    if approx.len() == n + 1 {
        debug!(n, "trimming odd-length reconstruction artifact");
        approx.truncate(n);
    } else if approx.len() != n {
        return Err(WaveletError::ShapeMismatch {
            expected: n,
            got: approx.len(),
            context: "multilevel reconstruction",
        });
    }
    Ok(approx)
}

/// Decomposes a 2-D image.
///
/// The filter-bank variants run separably (rows, then columns) and store
/// three directional planes per level; the additive variants smooth along
/// both axes and store the single residual plane.
///
/// # Errors
///
/// Same contract as [`decompose`], validated against the shorter image
/// extent.
pub fn decompose2(
    image: &Array2<f64>,
    config: &TransformConfig,
    cancel: Option<&CancelToken>,
) -> Result<Decomposition2, WaveletError> {
    let (rows, cols) = image.dim();
    if rows == 0 || cols == 0 {
        return Err(WaveletError::EmptySignal);
    }
    validate_levels(rows.min(cols), config)?;
    debug!(
        rows,
        cols,
        levels = config.n_levels(),
        wavelet = config.wavelet().name(),
        variant = ?config.variant(),
        "decomposing image"
    );

    let variant = config.variant();
    let boundary = config.boundary();
    let mut details = Vec::with_capacity(config.n_levels());
    let mut approx = image.clone();
    for level in 0..config.n_levels() {
        check_cancelled(cancel)?;
        match variant.lowpass_kernel(config.wavelet(), level) {
            Some(kernel) => {
                let rows_smooth =
                    convolve_axis(&approx, &kernel, ConvMode::Same, boundary, Axis(1))?;
                let smooth =
                    convolve_axis(&rows_smooth, &kernel, ConvMode::Same, boundary, Axis(0))?;
                details.push(DetailBands::Planar(&approx - &smooth));
                approx = smooth;
            }
            None => {
                let (a_rows, d_rows) = variant.decompose_level_axis(
                    &approx,
                    config.wavelet(),
                    boundary,
                    level,
                    Axis(1),
                )?;
                let (aa, horizontal) = variant.decompose_level_axis(
                    &a_rows,
                    config.wavelet(),
                    boundary,
                    level,
                    Axis(0),
                )?;
                let (vertical, diagonal) = variant.decompose_level_axis(
                    &d_rows,
                    config.wavelet(),
                    boundary,
                    level,
                    Axis(0),
                )?;
                details.push(DetailBands::Directional {
                    horizontal,
                    vertical,
                    diagonal,
                });
                approx = aa;
            }
        }
    }
    Ok(Decomposition2 {
        details,
        approx,
        shape: (rows, cols),
    })
}

/// Crops `a` down to `dim` when it overshoots by the single decimation
/// artifact sample along either axis.
fn crop_to(a: Array2<f64>, dim: (usize, usize)) -> Array2<f64> {
    let (r, c) = a.dim();
    if (r, c) == dim || r < dim.0 || c < dim.1 || r > dim.0 + 1 || c > dim.1 + 1 {
        return a;
    }
    a.slice(s![..dim.0, ..dim.1]).to_owned()
}

/// Reconstructs a 2-D image from its decomposition.
///
/// # Errors
///
/// Same contract as [`reconstruct`].
pub fn reconstruct2(
    decomposition: &Decomposition2,
    config: &TransformConfig,
    cancel: Option<&CancelToken>,
) -> Result<Array2<f64>, WaveletError> {
    let variant = config.variant();
    let mut approx = decomposition.approx.clone();
    for (level, bands) in decomposition.details.iter().enumerate().rev() {
        check_cancelled(cancel)?;
        approx = match bands {
            DetailBands::Planar(residual) => {
                if approx.dim() != residual.dim() {
                    return Err(WaveletError::ShapeMismatch {
                        expected: residual.len(),
                        got: approx.len(),
                        context: "additive reconstruction",
                    });
                }
                &approx + residual
            }
            DetailBands::Directional {
                horizontal,
                vertical,
                diagonal,
            } => {
                let aa = crop_to(approx, horizontal.dim());
                let a_rows = variant.reconstruct_level_axis(
                    &aa,
                    horizontal,
                    config.wavelet(),
                    level,
                    Axis(0),
                )?;
                let d_rows = variant.reconstruct_level_axis(
                    vertical,
                    diagonal,
                    config.wavelet(),
                    level,
                    Axis(0),
                )?;
                variant.reconstruct_level_axis(
                    &a_rows,
                    &d_rows,
                    config.wavelet(),
                    level,
                    Axis(1),
                )?
            }
        };
    }
    let shape = decomposition.shape;
    let (r, c) = approx.dim();
    if (r == shape.0 || r == shape.0 + 1) && (c == shape.1 || c == shape.1 + 1) {
        if (r, c) != shape {
            debug!(?shape, "trimming odd-length reconstruction artifact");
        }
        Ok(crop_to(approx, shape))
    } else {
        Err(WaveletError::ShapeMismatch {
            expected: shape.0 * shape.1,
            got: r * c,
            context: "multilevel reconstruction",
        })
    }
}
