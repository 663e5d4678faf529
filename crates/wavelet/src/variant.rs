//! Transform variants: one decomposition/reconstruction step per scheme.

use crate::boundary::BoundaryMode;
use crate::convolve::{convolve, convolve_axis, ConvMode};
use crate::error::WaveletError;
use crate::filter::Wavelet;
use crate::resample::{dilate, downsample, downsample_axis, upsample, upsample_axis};
use ndarray::{Array2, Axis};

/// A multiresolution decomposition scheme.
///
/// Each variant defines a single analysis step (`decompose_level`) and its
/// mirror synthesis step (`reconstruct_level`); the multilevel drivers in
/// [`crate::transform`] chain these. All variants are stateless — `level`
/// is the 0-based cascade depth and only affects filter dilation or kernel
/// width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformVariant {
    /// Critically-sampled discrete wavelet transform: filter then
    /// downsample by two. Coefficient arrays halve per level.
    Decimated,
    /// Stationary (shift-invariant) transform: filters dilated by
    /// `2^level`, no downsampling. Arrays grow by the dilated filter
    /// support per level.
    Undecimated,
    /// À-trous isotropic transform: dilated lowpass only, detail is the
    /// residual. Arrays keep the input length; reconstruction is additive.
    IsotropicUndecimated,
    /// Difference-of-Gaussians pyramid: smoothing kernel widens
    /// geometrically with level, detail is the residual, reconstruction is
    /// additive.
    PyramidDifference,
}

impl TransformVariant {
    /// Parses a transform variant from a case-insensitive name string.
    ///
    /// # Supported Names
    ///
    /// | Input | Variant |
    /// |-------|---------|
    /// | `"dwt"` | [`TransformVariant::Decimated`] |
    /// | `"uwt"` | [`TransformVariant::Undecimated`] |
    /// | `"uiwt"` | [`TransformVariant::IsotropicUndecimated`] |
    /// | `"pyramid"` | [`TransformVariant::PyramidDifference`] |
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::UnknownVariant`] if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, WaveletError> {
        match name.to_lowercase().as_str() {
            "dwt" => Ok(Self::Decimated),
            "uwt" => Ok(Self::Undecimated),
            "uiwt" => Ok(Self::IsotropicUndecimated),
            "pyramid" => Ok(Self::PyramidDifference),
            _ => Err(WaveletError::UnknownVariant(name.to_string())),
        }
    }

    /// Returns `true` if the variant stores one planar detail per level in
    /// 2-D (additive schemes), `false` for the three directional bands of
    /// the filter-bank schemes.
    pub fn is_additive(&self) -> bool {
        matches!(self, Self::IsotropicUndecimated | Self::PyramidDifference)
    }

    /// Maximum number of cascade levels for a signal of length `n` under a
    /// filter of `filter_len` taps.
    ///
    /// A level is feasible while the working signal is at least as long as
    /// the (dilated) filter support at that depth.
    pub fn max_level(&self, n: usize, filter_len: usize) -> usize {
        if n == 0 || filter_len < 2 {
            return 0;
        }
        match self {
            Self::Decimated => {
                let mut len = n;
                let mut levels = 0;
                while len >= filter_len {
                    len = (len + filter_len - 1) / 2;
                    levels += 1;
                }
                levels
            }
            Self::Undecimated | Self::IsotropicUndecimated => {
                let mut levels = 0;
                while support(filter_len, levels) <= n {
                    levels += 1;
                }
                levels
            }
            Self::PyramidDifference => {
                let mut levels = 0;
                while 2 * (1 + (1usize << levels)) + 1 <= n {
                    levels += 1;
                }
                levels
            }
        }
    }

    /// One analysis step: splits the working approximation into the next
    /// coarser approximation and one detail band.
    ///
    /// # Errors
    ///
    /// Propagates [`WaveletError::EmptySignal`] and
    /// [`WaveletError::ShapeMismatch`] from the convolution layer when the
    /// signal is shorter than the (dilated) filter.
    pub fn decompose_level(
        &self,
        signal: &[f64],
        wavelet: &Wavelet,
        boundary: BoundaryMode,
        level: usize,
    ) -> Result<(Vec<f64>, Vec<f64>), WaveletError> {
        match self {
            Self::Decimated => {
                let a = convolve(signal, wavelet.lo_d(), ConvMode::Full, boundary)?;
                let d = convolve(signal, wavelet.hi_d(), ConvMode::Full, boundary)?;
                Ok((downsample(&a, 2, 1), downsample(&d, 2, 1)))
            }
            Self::Undecimated => {
                let factor = 1 << level;
                let lo = dilate(wavelet.lo_d(), factor);
                let hi = dilate(wavelet.hi_d(), factor);
                let a = convolve(signal, &lo, ConvMode::Full, boundary)?;
                let d = convolve(signal, &hi, ConvMode::Full, boundary)?;
                Ok((a, d))
            }
            Self::IsotropicUndecimated => {
                let lo = dilate(wavelet.lo_d(), 1 << level);
                let a = convolve(signal, &lo, ConvMode::Same, boundary)?;
                let d = residual(signal, &a);
                Ok((a, d))
            }
            Self::PyramidDifference => {
                let g = gaussian_kernel(level);
                let a = convolve(signal, &g, ConvMode::Same, boundary)?;
                let d = residual(signal, &a);
                Ok((a, d))
            }
        }
    }

    /// Mirror synthesis step: merges an approximation and one detail band
    /// back into the finer approximation. Synthesis takes no boundary mode;
    /// the filter-bank schemes zero-extend and the additive schemes just
    /// sum.
    ///
    /// For [`TransformVariant::Decimated`] an approximation one sample
    /// longer than the detail is trimmed first; that single sample is the
    /// documented artifact of decimating an odd-length signal.
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::ShapeMismatch`] when the band lengths could
    /// not have come from a matching decomposition step.
    pub fn reconstruct_level(
        &self,
        approx: &[f64],
        detail: &[f64],
        wavelet: &Wavelet,
        level: usize,
    ) -> Result<Vec<f64>, WaveletError> {
        match self {
            Self::Decimated => {
                let a = if approx.len() == detail.len() + 1 {
                    &approx[..detail.len()]
                } else {
                    approx
                };
                check_equal_len(a.len(), detail.len(), "decimated reconstruction")?;
                let ua = upsample(a, 2, 1, true);
                let ud = upsample(detail, 2, 1, true);
                let ra = convolve(&ua, wavelet.lo_r(), ConvMode::Valid, BoundaryMode::Zero)?;
                let rd = convolve(&ud, wavelet.hi_r(), ConvMode::Valid, BoundaryMode::Zero)?;
                Ok(sum_bands(&ra, &rd, 1.0))
            }
            Self::Undecimated => {
                check_equal_len(approx.len(), detail.len(), "stationary reconstruction")?;
                let factor = 1 << level;
                let lo = dilate(wavelet.lo_r(), factor);
                let hi = dilate(wavelet.hi_r(), factor);
                let ra = convolve(approx, &lo, ConvMode::Valid, BoundaryMode::Zero)?;
                let rd = convolve(detail, &hi, ConvMode::Valid, BoundaryMode::Zero)?;
                Ok(sum_bands(&ra, &rd, 0.5))
            }
            Self::IsotropicUndecimated | Self::PyramidDifference => {
                check_equal_len(approx.len(), detail.len(), "additive reconstruction")?;
                Ok(approx.iter().zip(detail).map(|(a, d)| a + d).collect())
            }
        }
    }

    /// Axis-wise analysis step for separable 2-D transforms.
    pub fn decompose_level_axis(
        &self,
        data: &Array2<f64>,
        wavelet: &Wavelet,
        boundary: BoundaryMode,
        level: usize,
        axis: Axis,
    ) -> Result<(Array2<f64>, Array2<f64>), WaveletError> {
        match self {
            Self::Decimated => {
                let a = convolve_axis(data, wavelet.lo_d(), ConvMode::Full, boundary, axis)?;
                let d = convolve_axis(data, wavelet.hi_d(), ConvMode::Full, boundary, axis)?;
                Ok((
                    downsample_axis(&a, 2, 1, axis)?,
                    downsample_axis(&d, 2, 1, axis)?,
                ))
            }
            Self::Undecimated => {
                let factor = 1 << level;
                let lo = dilate(wavelet.lo_d(), factor);
                let hi = dilate(wavelet.hi_d(), factor);
                let a = convolve_axis(data, &lo, ConvMode::Full, boundary, axis)?;
                let d = convolve_axis(data, &hi, ConvMode::Full, boundary, axis)?;
                Ok((a, d))
            }
            Self::IsotropicUndecimated => {
                let lo = dilate(wavelet.lo_d(), 1 << level);
                let a = convolve_axis(data, &lo, ConvMode::Same, boundary, axis)?;
                let d = data - &a;
                Ok((a, d))
            }
            Self::PyramidDifference => {
                let g = gaussian_kernel(level);
                let a = convolve_axis(data, &g, ConvMode::Same, boundary, axis)?;
                let d = data - &a;
                Ok((a, d))
            }
        }
    }

    /// Axis-wise synthesis step for separable 2-D transforms.
    pub fn reconstruct_level_axis(
        &self,
        approx: &Array2<f64>,
        detail: &Array2<f64>,
        wavelet: &Wavelet,
        level: usize,
        axis: Axis,
    ) -> Result<Array2<f64>, WaveletError> {
        match self {
            Self::Decimated => {
                let al = approx.len_of(axis);
                let dl = detail.len_of(axis);
                let a_view;
                let a = if al == dl + 1 {
                    a_view = trim_axis(approx, axis, dl);
                    &a_view
                } else {
                    approx
                };
                check_equal_len(a.len_of(axis), dl, "decimated reconstruction")?;
                let ua = upsample_axis(a, 2, 1, true, axis)?;
                let ud = upsample_axis(detail, 2, 1, true, axis)?;
                let ra =
                    convolve_axis(&ua, wavelet.lo_r(), ConvMode::Valid, BoundaryMode::Zero, axis)?;
                let rd =
                    convolve_axis(&ud, wavelet.hi_r(), ConvMode::Valid, BoundaryMode::Zero, axis)?;
                Ok(ra + rd)
            }
            Self::Undecimated => {
                check_equal_len(
                    approx.len_of(axis),
                    detail.len_of(axis),
                    "stationary reconstruction",
                )?;
                let factor = 1 << level;
                let lo = dilate(wavelet.lo_r(), factor);
                let hi = dilate(wavelet.hi_r(), factor);
                let ra = convolve_axis(approx, &lo, ConvMode::Valid, BoundaryMode::Zero, axis)?;
                let rd = convolve_axis(detail, &hi, ConvMode::Valid, BoundaryMode::Zero, axis)?;
                Ok((ra + rd) * 0.5)
            }
            Self::IsotropicUndecimated | Self::PyramidDifference => {
                check_equal_len(approx.len(), detail.len(), "additive reconstruction")?;
                Ok(approx + detail)
            }
        }
    }
}

impl TransformVariant {
    /// Smoothing kernel of the additive schemes at the given depth, `None`
    /// for the filter-bank schemes.
    pub(crate) fn lowpass_kernel(&self, wavelet: &Wavelet, level: usize) -> Option<Vec<f64>> {
        match self {
            Self::IsotropicUndecimated => Some(dilate(wavelet.lo_d(), 1 << level)),
            Self::PyramidDifference => Some(gaussian_kernel(level)),
            _ => None,
        }
    }
}

/// Dilated filter support at the given cascade depth.
fn support(filter_len: usize, level: usize) -> usize {
    (filter_len - 1) * (1 << level) + 1
}

/// Normalized Gaussian smoothing kernel for the pyramid scheme.
///
/// Half-width `1 + 2^level`, standard deviation `1 + 2^level / 2.3`.
pub(crate) fn gaussian_kernel(level: usize) -> Vec<f64> {
    let w = 1 + (1usize << level);
    let sigma = 1.0 + (1u64 << level) as f64 / 2.3;
    let mut g: Vec<f64> = (0..2 * w + 1)
        .map(|i| {
            let x = i as f64 - w as f64;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = g.iter().sum();
    for v in &mut g {
        *v /= sum;
    }
    g
}

fn residual(signal: &[f64], approx: &[f64]) -> Vec<f64> {
    debug_assert_eq!(signal.len(), approx.len());
    signal.iter().zip(approx).map(|(s, a)| s - a).collect()
}

fn sum_bands(a: &[f64], d: &[f64], scale: f64) -> Vec<f64> {
    debug_assert_eq!(a.len(), d.len());
    a.iter().zip(d).map(|(x, y)| (x + y) * scale).collect()
}

fn check_equal_len(expected: usize, got: usize, context: &'static str) -> Result<(), WaveletError> {
    if expected == got {
        Ok(())
    } else {
        Err(WaveletError::ShapeMismatch {
            expected,
            got,
            context,
        })
    }
}

/// First `len` lanes of `data` along `axis`.
fn trim_axis(data: &Array2<f64>, axis: Axis, len: usize) -> Array2<f64> {
    match axis {
        Axis(1) => data.slice(ndarray::s![.., ..len]).to_owned(),
        _ => data.slice(ndarray::s![..len, ..]).to_owned(),
    }
}
