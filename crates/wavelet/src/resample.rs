//! Dyadic resampling: downsampling, zero-stuffed upsampling, and à-trous
//! filter dilation.

use crate::boundary::stack_lanes;
use crate::error::WaveletError;
use ndarray::{Array2, Axis};

/// Keeps every `factor`-th sample starting at `phase`.
///
/// `downsample(x, f, p)` returns `[x[p], x[p + f], x[p + 2f], ...]`.
pub fn downsample(signal: &[f64], factor: usize, phase: usize) -> Vec<f64> {
    debug_assert!(factor >= 1);
    if phase >= signal.len() {
        return Vec::new();
    }
    signal[phase..].iter().step_by(factor).copied().collect()
}

/// Spreads samples `factor` apart, filling the gaps with zeros.
///
/// The result has length `factor * signal.len()` (plus one when
/// `pad_trailing_zero` is set), with `signal[i]` landing at
/// `factor * i + phase`. The trailing zero is what reconstruction needs to
/// recover the exact pre-decimation length.
pub fn upsample(signal: &[f64], factor: usize, phase: usize, pad_trailing_zero: bool) -> Vec<f64> {
    debug_assert!(factor >= 1);
    debug_assert!(phase < factor);
    let n = signal.len();
    let mut out = vec![0.0; factor * n + usize::from(pad_trailing_zero)];
    for (i, &v) in signal.iter().enumerate() {
        out[factor * i + phase] = v;
    }
    out
}

/// À-trous dilation of a filter: inserts `factor - 1` zeros between taps.
///
/// The result has length `(m - 1) * factor + 1`, keeping the first and last
/// taps at the ends.
pub fn dilate(kernel: &[f64], factor: usize) -> Vec<f64> {
    debug_assert!(factor >= 1);
    let m = kernel.len();
    if m == 0 {
        return Vec::new();
    }
    let mut out = vec![0.0; (m - 1) * factor + 1];
    for (i, &v) in kernel.iter().enumerate() {
        out[factor * i] = v;
    }
    out
}

/// Downsamples every lane of a 2-D array along the given axis.
pub fn downsample_axis(
    data: &Array2<f64>,
    factor: usize,
    phase: usize,
    axis: Axis,
) -> Result<Array2<f64>, WaveletError> {
    let lanes: Vec<Vec<f64>> = data
        .lanes(axis)
        .into_iter()
        .map(|lane| downsample(&lane.to_vec(), factor, phase))
        .collect();
    stack_lanes(&lanes, data, axis)
}

/// Upsamples every lane of a 2-D array along the given axis.
pub fn upsample_axis(
    data: &Array2<f64>,
    factor: usize,
    phase: usize,
    pad_trailing_zero: bool,
    axis: Axis,
) -> Result<Array2<f64>, WaveletError> {
    let lanes: Vec<Vec<f64>> = data
        .lanes(axis)
        .into_iter()
        .map(|lane| upsample(&lane.to_vec(), factor, phase, pad_trailing_zero))
        .collect();
    stack_lanes(&lanes, data, axis)
}
