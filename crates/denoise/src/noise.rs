//! Noise synthesis and estimation.

use crate::denoise::DenoiseConfig;
use crate::error::DenoiseError;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::debug;
use wisp_wavelet::{decompose, decompose2, WaveletError};

/// Builds a seeded or OS-sourced RNG.
fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Rejects sigmas that cannot describe a noise level. `Normal::new` only
/// refuses NaN and mirrors samples for a negative std-dev, so the range
/// check has to happen here.
pub(crate) fn validate_sigma(sigma: f64) -> Result<(), DenoiseError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(DenoiseError::NoiseEstimationFailed {
            reason: format!("noise sigma must be finite and non-negative, got {sigma}"),
        });
    }
    Ok(())
}

/// Generates a Gaussian noise field of the given shape.
///
/// # Errors
///
/// Returns [`DenoiseError::NoiseEstimationFailed`] when `sigma` is
/// negative or non-finite.
pub fn gaussian_noise(
    shape: (usize, usize),
    mean: f64,
    sigma: f64,
    seed: Option<u64>,
) -> Result<Array2<f64>, DenoiseError> {
    validate_sigma(sigma)?;
    let normal = Normal::new(mean, sigma).map_err(|e| DenoiseError::NoiseEstimationFailed {
        reason: format!("invalid noise distribution: {e}"),
    })?;
    let mut rng = make_rng(seed);
    Ok(Array2::from_shape_fn(shape, |_| normal.sample(&mut rng)))
}

/// 1-D counterpart of [`gaussian_noise`].
pub fn gaussian_noise_1d(
    len: usize,
    mean: f64,
    sigma: f64,
    seed: Option<u64>,
) -> Result<Vec<f64>, DenoiseError> {
    validate_sigma(sigma)?;
    let normal = Normal::new(mean, sigma).map_err(|e| DenoiseError::NoiseEstimationFailed {
        reason: format!("invalid noise distribution: {e}"),
    })?;
    let mut rng = make_rng(seed);
    Ok((0..len).map(|_| normal.sample(&mut rng)).collect())
}

/// Population standard deviation of a sample.
fn std_dev<'a, I: Iterator<Item = &'a f64> + Clone>(values: I) -> f64 {
    let n = values.clone().count();
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = values.clone().sum::<f64>() / nf;
    let var = values.map(|&v| (v - mean) * (v - mean)).sum::<f64>() / nf;
    var.sqrt()
}

/// Iterative k-sigma clipping estimate of the background noise sigma.
///
/// Repeatedly discards samples more than three standard deviations from
/// the running mean until the estimate stabilizes within 1%, so bright
/// structure does not inflate the estimate.
///
/// # Errors
///
/// Returns [`DenoiseError::NoiseEstimationFailed`] for empty input or when
/// clipping eliminates every sample.
pub fn k_sigma_noise_estimation(data: &Array2<f64>) -> Result<f64, DenoiseError> {
    const K: f64 = 3.0;
    const MAX_ITER: usize = 20;
    const REL_TOL: f64 = 0.01;

    if data.is_empty() {
        return Err(DenoiseError::NoiseEstimationFailed {
            reason: "empty input".into(),
        });
    }
    let mut values: Vec<f64> = data.iter().copied().collect();
    let mut sigma = std_dev(values.iter());
    for _ in 0..MAX_ITER {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let clipped: Vec<f64> = values
            .iter()
            .copied()
            .filter(|v| (v - mean).abs() <= K * sigma)
            .collect();
        if clipped.is_empty() {
            return Err(DenoiseError::NoiseEstimationFailed {
                reason: "k-sigma clipping eliminated all samples".into(),
            });
        }
        let next = std_dev(clipped.iter());
        let converged = sigma > 0.0 && (sigma - next).abs() / sigma < REL_TOL;
        values = clipped;
        sigma = next;
        if converged {
            break;
        }
    }
    debug!(sigma, "k-sigma noise estimate");
    Ok(sigma)
}

/// Per-plane response of the configured transform to unit-sigma noise.
///
/// Thresholds for real data scale these by the data's noise sigma. The
/// model is deterministic for a fixed seed.
#[derive(Clone, Debug)]
pub struct NoiseModel {
    sigmas: Vec<f64>,
}

impl NoiseModel {
    /// Estimates the model for 2-D denoising by decomposing a unit-sigma
    /// Gaussian field of `reference_shape` under `config`'s transform and
    /// recording each detail plane's standard deviation in decomposition
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`DenoiseError::NoiseEstimationFailed`] when the reference
    /// shape cannot support the configured depth.
    pub fn estimate(
        config: &DenoiseConfig,
        reference_shape: (usize, usize),
        seed: Option<u64>,
    ) -> Result<Self, DenoiseError> {
        let noise = gaussian_noise(reference_shape, 0.0, 1.0, seed)?;
        let dec = decompose2(&noise, &config.transform_config(), None)
            .map_err(infeasible_reference)?;
        let sigmas = dec.planes().map(|p| std_dev(p.iter())).collect();
        Ok(Self { sigmas })
    }

    /// 1-D counterpart of [`NoiseModel::estimate`].
    pub fn estimate_1d(
        config: &DenoiseConfig,
        reference_len: usize,
        seed: Option<u64>,
    ) -> Result<Self, DenoiseError> {
        let noise = gaussian_noise_1d(reference_len, 0.0, 1.0, seed)?;
        let dec =
            decompose(&noise, &config.transform_config(), None).map_err(infeasible_reference)?;
        let sigmas = dec.details().map(|d| std_dev(d.iter())).collect();
        Ok(Self { sigmas })
    }

    /// Returns the per-plane unit-noise sigmas in decomposition order.
    pub fn sigmas(&self) -> &[f64] {
        &self.sigmas
    }

    /// Returns the unit-noise sigma of the given plane.
    pub fn sigma(&self, plane: usize) -> Option<f64> {
        self.sigmas.get(plane).copied()
    }

    /// Returns the number of modeled planes.
    pub fn n_planes(&self) -> usize {
        self.sigmas.len()
    }
}

fn infeasible_reference(err: WaveletError) -> DenoiseError {
    match err {
        WaveletError::InvalidLevel { requested, max, len } => {
            DenoiseError::NoiseEstimationFailed {
                reason: format!(
                    "reference of extent {len} supports {max} levels, {requested} requested"
                ),
            }
        }
        other => DenoiseError::Wavelet(other),
    }
}
