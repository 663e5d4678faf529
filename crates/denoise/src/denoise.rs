//! Threshold denoising on multiresolution coefficients.

use crate::error::DenoiseError;
use crate::noise::{k_sigma_noise_estimation, validate_sigma, NoiseModel};
use ndarray::Array2;
use tracing::debug;
use wisp_wavelet::{
    decompose, decompose2, reconstruct, reconstruct2, BoundaryMode, CancelToken, TransformConfig,
    TransformVariant, Wavelet,
};

/// How coefficients below and above the threshold are treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThresholdMode {
    /// Zeroes coefficients with magnitude below the threshold, keeps the
    /// rest untouched.
    Hard,
    /// Zeroes sub-threshold coefficients and shrinks survivors toward zero
    /// by the threshold, preserving their sign.
    Soft,
}

impl Default for ThresholdMode {
    /// Returns `ThresholdMode::Hard` as the default mode.
    fn default() -> Self {
        Self::Hard
    }
}

/// Configuration for a denoising run.
///
/// Wraps a transform configuration plus the thresholding rule. The default
/// threshold factor of 4 keeps only detail coefficients more than four
/// noise standard deviations from zero.
///
/// # Example
///
/// ```ignore
/// use wisp_denoise::{DenoiseConfig, ThresholdMode};
/// use wisp_wavelet::{TransformVariant, Wavelet};
///
/// let config = DenoiseConfig::new(Wavelet::from_name("db2")?)
///     .with_variant(TransformVariant::Undecimated)
///     .with_levels(3)
///     .with_threshold_factor(3.0)
///     .with_mode(ThresholdMode::Soft);
/// ```
#[derive(Clone, Debug)]
pub struct DenoiseConfig {
    wavelet: Wavelet,
    boundary: BoundaryMode,
    variant: TransformVariant,
    n_levels: usize,
    threshold_factor: f64,
    mode: ThresholdMode,
    model_seed: Option<u64>,
}

impl DenoiseConfig {
    /// Creates a configuration with defaults: undecimated variant,
    /// symmetric boundary, three levels, hard thresholding at factor 4,
    /// and a fixed noise-model seed.
    pub fn new(wavelet: Wavelet) -> Self {
        Self {
            wavelet,
            boundary: BoundaryMode::Symmetric,
            variant: TransformVariant::Undecimated,
            n_levels: 3,
            threshold_factor: 4.0,
            mode: ThresholdMode::Hard,
            model_seed: Some(0),
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

    /// Sets the threshold factor (noise standard deviations).
    pub fn with_threshold_factor(mut self, factor: f64) -> Self {
        self.threshold_factor = factor;
        self
    }

    /// Sets the thresholding mode.
    pub fn with_mode(mut self, mode: ThresholdMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the seed for noise-model estimation; `None` draws from the OS.
    pub fn with_model_seed(mut self, seed: Option<u64>) -> Self {
        self.model_seed = seed;
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

    /// Returns the threshold factor.
    pub fn threshold_factor(&self) -> f64 {
        self.threshold_factor
    }

    /// Returns the thresholding mode.
    pub fn mode(&self) -> ThresholdMode {
        self.mode
    }

    /// Returns the noise-model seed.
    pub fn model_seed(&self) -> Option<u64> {
        self.model_seed
    }

    /// Returns the equivalent transform configuration.
    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig::new(self.wavelet.clone())
            .with_boundary(self.boundary)
            .with_variant(self.variant)
            .with_levels(self.n_levels)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DenoiseError::InvalidThreshold`] for a negative or
    /// non-finite threshold factor.
    pub fn validate(&self) -> Result<(), DenoiseError> {
        if !self.threshold_factor.is_finite() || self.threshold_factor < 0.0 {
            return Err(DenoiseError::InvalidThreshold(self.threshold_factor));
        }
        Ok(())
    }
}

/// Applies one threshold to a single value.
fn shrink(v: f64, threshold: f64, mode: ThresholdMode) -> f64 {
    if v.abs() < threshold {
        0.0
    } else {
        match mode {
            ThresholdMode::Hard => v,
            ThresholdMode::Soft => v - v.signum() * threshold,
        }
    }
}

/// Denoises a 2-D image.
///
/// Estimates the noise sigma with k-sigma clipping when `sigma` is absent,
/// builds the unit-noise model for the configured transform, decomposes
/// the image, thresholds every detail plane at
/// `threshold_factor * sigma * model[plane]`, and reconstructs. The
/// approximation plane is never thresholded. The cancel token is forwarded
/// to both transform directions.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`DenoiseError::InvalidThreshold`] | negative or non-finite threshold factor |
/// | [`DenoiseError::NoiseEstimationFailed`] | invalid caller-supplied sigma, sigma estimation or noise model failure |
/// | [`DenoiseError::Wavelet`] | transform failure, including cancellation |
pub fn denoise(
    image: &Array2<f64>,
    sigma: Option<f64>,
    config: &DenoiseConfig,
    cancel: Option<&CancelToken>,
) -> Result<Array2<f64>, DenoiseError> {
    config.validate()?;
    let sigma = match sigma {
        Some(s) => {
            validate_sigma(s)?;
            s
        }
        None => k_sigma_noise_estimation(image)?,
    };
    let model = NoiseModel::estimate(config, image.dim(), config.model_seed())?;
    debug!(
        sigma,
        factor = config.threshold_factor(),
        planes = model.n_planes(),
        mode = ?config.mode(),
        "denoising image"
    );

    let transform = config.transform_config();
    let dec = decompose2(image, &transform, cancel)?;
    let thresholded = dec.map_planes(|plane_index, plane| {
        let threshold = config.threshold_factor() * sigma * model.sigmas()[plane_index];
        plane.mapv(|v| shrink(v, threshold, config.mode()))
    })?;
    Ok(reconstruct2(&thresholded, &transform, cancel)?)
}

/// Denoises a 1-D signal; the per-band thresholds come from a model of the
/// same length.
///
/// # Errors
///
/// Same contract as [`denoise`].
pub fn denoise_signal(
    signal: &[f64],
    sigma: Option<f64>,
    config: &DenoiseConfig,
    cancel: Option<&CancelToken>,
) -> Result<Vec<f64>, DenoiseError> {
    config.validate()?;
    let sigma = match sigma {
        Some(s) => {
            validate_sigma(s)?;
            s
        }
        None => {
            let column = Array2::from_shape_vec((signal.len(), 1), signal.to_vec()).map_err(
                |_| DenoiseError::NoiseEstimationFailed {
                    reason: "empty input".into(),
                },
            )?;
            k_sigma_noise_estimation(&column)?
        }
    };
    let model = NoiseModel::estimate_1d(config, signal.len(), config.model_seed())?;
    debug!(
        sigma,
        factor = config.threshold_factor(),
        bands = model.n_planes(),
        mode = ?config.mode(),
        "denoising signal"
    );

    let transform = config.transform_config();
    let dec = decompose(signal, &transform, cancel)?;
    let thresholded = dec.map_details(|level, band| {
        let threshold = config.threshold_factor() * sigma * model.sigmas()[level];
        band.iter()
            .map(|&v| shrink(v, threshold, config.mode()))
            .collect()
    })?;
    Ok(reconstruct(&thresholded, &transform, cancel)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::gaussian_noise;

    fn config() -> DenoiseConfig {
        DenoiseConfig::new(Wavelet::from_name("haar").unwrap()).with_levels(2)
    }

    #[test]
    fn config_defaults() {
        let c = config();
        assert_eq!(c.boundary(), BoundaryMode::Symmetric);
        assert_eq!(c.variant(), TransformVariant::Undecimated);
        assert_eq!(c.mode(), ThresholdMode::Hard);
        assert!((c.threshold_factor() - 4.0).abs() < f64::EPSILON);
        assert_eq!(c.model_seed(), Some(0));
    }

    #[test]
    fn validate_rejects_bad_factor() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let c = config().with_threshold_factor(bad);
            let err = c.validate().unwrap_err();
            assert!(matches!(err, DenoiseError::InvalidThreshold(_)));
        }
    }

    #[test]
    fn shrink_hard() {
        assert_eq!(shrink(0.5, 1.0, ThresholdMode::Hard), 0.0);
        assert_eq!(shrink(-0.5, 1.0, ThresholdMode::Hard), 0.0);
        assert_eq!(shrink(2.0, 1.0, ThresholdMode::Hard), 2.0);
        assert_eq!(shrink(-2.0, 1.0, ThresholdMode::Hard), -2.0);
    }

    #[test]
    fn shrink_soft_preserves_sign() {
        assert_eq!(shrink(0.5, 1.0, ThresholdMode::Soft), 0.0);
        assert_eq!(shrink(2.0, 1.0, ThresholdMode::Soft), 1.0);
        assert_eq!(shrink(-2.0, 1.0, ThresholdMode::Soft), -1.0);
    }

    #[test]
    fn rejects_invalid_supplied_sigma() {
        // A negative sigma would turn every threshold negative and make
        // denoising a silent no-op.
        let image = gaussian_noise((16, 16), 0.0, 1.0, Some(2)).unwrap();
        for bad in [-1.0, f64::NAN] {
            let err = denoise(&image, Some(bad), &config(), None).unwrap_err();
            assert!(matches!(err, DenoiseError::NoiseEstimationFailed { .. }));
            let row: Vec<f64> = image.row(0).to_vec();
            let err = denoise_signal(&row, Some(bad), &config(), None).unwrap_err();
            assert!(matches!(err, DenoiseError::NoiseEstimationFailed { .. }));
        }
    }

    #[test]
    fn zero_factor_is_identity() {
        // Threshold 0 keeps every coefficient, so the round-trip is exact.
        let image = gaussian_noise((24, 24), 0.0, 1.0, Some(3)).unwrap();
        let c = config().with_threshold_factor(0.0);
        let out = denoise(&image, Some(1.0), &c, None).unwrap();
        for (o, e) in out.iter().zip(image.iter()) {
            assert!((o - e).abs() < 1e-9);
        }
    }

    #[test]
    fn pure_noise_is_suppressed() {
        let image = gaussian_noise((48, 48), 0.0, 1.0, Some(5)).unwrap();
        let out = denoise(&image, Some(1.0), &config(), None).unwrap();
        let energy_in: f64 = image.iter().map(|v| v * v).sum();
        let energy_out: f64 = out.iter().map(|v| v * v).sum();
        assert!(
            energy_out < 0.5 * energy_in,
            "energy {energy_out} vs {energy_in}"
        );
    }

    #[test]
    fn cancelled_token_aborts() {
        let image = gaussian_noise((16, 16), 0.0, 1.0, Some(1)).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let err = denoise(&image, Some(1.0), &config(), Some(&token)).unwrap_err();
        assert!(matches!(
            err,
            DenoiseError::Wavelet(wisp_wavelet::WaveletError::Cancelled)
        ));
    }

    #[test]
    fn signal_path_runs() {
        let noise = crate::noise::gaussian_noise_1d(256, 0.0, 1.0, Some(9)).unwrap();
        let out = denoise_signal(&noise, Some(1.0), &config(), None).unwrap();
        assert_eq!(out.len(), noise.len());
        let energy_in: f64 = noise.iter().map(|v| v * v).sum();
        let energy_out: f64 = out.iter().map(|v| v * v).sum();
        assert!(energy_out < energy_in);
    }

    #[test]
    fn config_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<DenoiseConfig>();
        assert_impl::<ThresholdMode>();
    }
}
