//! Boundary extension of finite signals.

use crate::error::WaveletError;
use ndarray::{Array2, Axis};

/// How a signal is assumed to continue past its first and last sample.
///
/// Extension resolves virtual indices at arbitrary distance, so the pad
/// width may exceed the signal length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryMode {
    /// Samples outside the signal are zero.
    Zero,
    /// Half-sample reflection: the edge sample is repeated as the first
    /// mirrored value (`[a, b, c]` extends left to `..., b, a | a, b, c`).
    Symmetric,
    /// The signal wraps around modulo its length.
    Periodic,
}

impl Default for BoundaryMode {
    /// Returns `BoundaryMode::Symmetric` as the default mode.
    fn default() -> Self {
        Self::Symmetric
    }
}

impl BoundaryMode {
    /// Parses a boundary mode from a case-insensitive name string.
    ///
    /// # Supported Names
    ///
    /// | Input | Mode |
    /// |-------|------|
    /// | `"zero"` | [`BoundaryMode::Zero`] |
    /// | `"symm"` | [`BoundaryMode::Symmetric`] |
    /// | `"wrap"` | [`BoundaryMode::Periodic`] |
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::UnknownBoundary`] if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, WaveletError> {
        match name.to_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "symm" => Ok(Self::Symmetric),
            "wrap" => Ok(Self::Periodic),
            _ => Err(WaveletError::UnknownBoundary(name.to_string())),
        }
    }

    /// Resolves a possibly out-of-range index into the signal, or `None`
    /// for zero extension outside the support.
    fn resolve(&self, i: isize, len: usize) -> Option<usize> {
        let n = len as isize;
        if (0..n).contains(&i) {
            return Some(i as usize);
        }
        match self {
            Self::Zero => None,
            Self::Symmetric => {
                // Fold into [0, 2n) over the reflected period, then mirror.
                let p = 2 * n;
                let mut r = ((i % p) + p) % p;
                if r >= n {
                    r = p - 1 - r;
                }
                Some(r as usize)
            }
            Self::Periodic => Some((((i % n) + n) % n) as usize),
        }
    }
}

/// Extends a signal by `left` samples on the left and `right` on the right.
///
/// The result has length `left + signal.len() + right`, with the original
/// samples at offset `left`.
///
/// # Errors
///
/// Returns [`WaveletError::EmptySignal`] if the signal is empty.
pub fn extend(
    signal: &[f64],
    left: usize,
    right: usize,
    mode: BoundaryMode,
) -> Result<Vec<f64>, WaveletError> {
    let n = signal.len();
    if n == 0 {
        return Err(WaveletError::EmptySignal);
    }
    let mut out = Vec::with_capacity(left + n + right);
    for k in 0..left + n + right {
        let i = k as isize - left as isize;
        out.push(match mode.resolve(i, n) {
            Some(j) => signal[j],
            None => 0.0,
        });
    }
    Ok(out)
}

/// Extends every lane of a 2-D array along the given axis.
pub fn extend_axis(
    data: &Array2<f64>,
    left: usize,
    right: usize,
    mode: BoundaryMode,
    axis: Axis,
) -> Result<Array2<f64>, WaveletError> {
    let lanes: Vec<Vec<f64>> = data
        .lanes(axis)
        .into_iter()
        .map(|lane| extend(&lane.to_vec(), left, right, mode))
        .collect::<Result<_, _>>()?;
    stack_lanes(&lanes, data, axis)
}

/// Rebuilds a 2-D array from per-lane results computed along `axis`.
pub(crate) fn stack_lanes(
    lanes: &[Vec<f64>],
    original: &Array2<f64>,
    axis: Axis,
) -> Result<Array2<f64>, WaveletError> {
    let lane_len = lanes.first().map(|l| l.len()).unwrap_or(0);
    if lane_len == 0 {
        return Err(WaveletError::EmptySignal);
    }
    let shape = match axis {
        Axis(1) => (lanes.len(), lane_len),
        _ => (lane_len, lanes.len()),
    };
    let mut out = Array2::zeros(shape);
    for (k, lane) in lanes.iter().enumerate() {
        debug_assert_eq!(lane.len(), lane_len);
        for (i, &v) in lane.iter().enumerate() {
            match axis {
                Axis(1) => out[[k, i]] = v,
                _ => out[[i, k]] = v,
            }
        }
    }
    debug_assert_eq!(out.len_of(Axis(1 - axis.index())), original.len_of(Axis(1 - axis.index())));
    Ok(out)
}
