//! Discrete convolution in full, same, and valid modes.

use crate::boundary::{extend, extend_axis, stack_lanes, BoundaryMode};
use crate::error::WaveletError;
use ndarray::{Array2, Axis};

/// Output-length convention for a convolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConvMode {
    /// Every overlap position: output length `n + m - 1`. Out-of-range
    /// samples come from the boundary mode.
    Full,
    /// Centered crop of `Full` to the input length `n`.
    Same,
    /// Complete-overlap positions only: output length `n - m + 1`, no
    /// boundary extension.
    Valid,
}

/// Valid convolution of an already-extended signal with a kernel.
///
/// `out[i] = sum_j kernel[j] * u[i + m - 1 - j]` for
/// `i in 0..u.len() - m + 1`.
fn convolve_valid(u: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = u.len();
    let m = kernel.len();
    debug_assert!(n >= m);
    let mut out = vec![0.0; n - m + 1];
    for (i, o) in out.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (j, &k) in kernel.iter().enumerate() {
            acc += k * u[i + m - 1 - j];
        }
        *o = acc;
    }
    out
}

/// Convolves a signal with a kernel.
///
/// In `Full` and `Same` modes the signal is extended by `m - 1` samples on
/// each side under `boundary` before the sliding product; `Full` with
/// [`BoundaryMode::Zero`] therefore matches the textbook zero-padded
/// convolution exactly.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`WaveletError::EmptySignal`] | empty signal or kernel |
/// | [`WaveletError::ShapeMismatch`] | `Valid` mode with `n < m` |
pub fn convolve(
    signal: &[f64],
    kernel: &[f64],
    mode: ConvMode,
    boundary: BoundaryMode,
) -> Result<Vec<f64>, WaveletError> {
    let n = signal.len();
    let m = kernel.len();
    if n == 0 || m == 0 {
        return Err(WaveletError::EmptySignal);
    }
    match mode {
        ConvMode::Full => {
            let u = extend(signal, m - 1, m - 1, boundary)?;
            Ok(convolve_valid(&u, kernel))
        }
        ConvMode::Same => {
            let u = extend(signal, m - 1, m - 1, boundary)?;
            let full = convolve_valid(&u, kernel);
            let start = (m - 1) / 2;
            Ok(full[start..start + n].to_vec())
        }
        ConvMode::Valid => {
            if n < m {
                return Err(WaveletError::ShapeMismatch {
                    expected: m,
                    got: n,
                    context: "valid convolution",
                });
            }
            Ok(convolve_valid(signal, kernel))
        }
    }
}

/// Convolves every lane of a 2-D array along the given axis.
pub fn convolve_axis(
    data: &Array2<f64>,
    kernel: &[f64],
    mode: ConvMode,
    boundary: BoundaryMode,
    axis: Axis,
) -> Result<Array2<f64>, WaveletError> {
    let lanes: Vec<Vec<f64>> = data
        .lanes(axis)
        .into_iter()
        .map(|lane| convolve(&lane.to_vec(), kernel, mode, boundary))
        .collect::<Result<_, _>>()?;
    stack_lanes(&lanes, data, axis)
}

/// Convolves a 2-D array with a dense 2-D kernel.
///
/// Applies the 1-D length conventions to both axes (`Same` keeps the input
/// shape). Boundary extension happens along rows first, then columns, which
/// matches separable extension for the supported modes.
pub fn convolve2d(
    data: &Array2<f64>,
    kernel: &Array2<f64>,
    mode: ConvMode,
    boundary: BoundaryMode,
) -> Result<Array2<f64>, WaveletError> {
    let (n0, n1) = data.dim();
    let (m0, m1) = kernel.dim();
    if n0 == 0 || n1 == 0 || m0 == 0 || m1 == 0 {
        return Err(WaveletError::EmptySignal);
    }
    let (ext, off0, off1) = match mode {
        ConvMode::Full | ConvMode::Same => {
            let rows = extend_axis(data, m1 - 1, m1 - 1, boundary, Axis(1))?;
            let both = extend_axis(&rows, m0 - 1, m0 - 1, boundary, Axis(0))?;
            match mode {
                ConvMode::Same => (both, (m0 - 1) / 2, (m1 - 1) / 2),
                _ => (both, 0, 0),
            }
        }
        ConvMode::Valid => {
            if n0 < m0 || n1 < m1 {
                return Err(WaveletError::ShapeMismatch {
                    expected: m0.max(m1),
                    got: n0.min(n1),
                    context: "valid convolution",
                });
            }
            (data.clone(), 0, 0)
        }
    };
    let (e0, e1) = ext.dim();
    let full0 = e0 - m0 + 1;
    let full1 = e1 - m1 + 1;
    let (out0, out1) = match mode {
        ConvMode::Same => (n0, n1),
        _ => (full0, full1),
    };
    let mut out = Array2::zeros((out0, out1));
    for i in 0..out0 {
        for j in 0..out1 {
            let (bi, bj) = (i + off0, j + off1);
            let mut acc = 0.0;
            for p in 0..m0 {
                for q in 0..m1 {
                    acc += kernel[[p, q]] * ext[[bi + m0 - 1 - p, bj + m1 - 1 - q]];
                }
            }
            out[[i, j]] = acc;
        }
    }
    Ok(out)
}
