//! End-to-end denoising pipeline tests on synthetic images.

use ndarray::Array2;
use wisp_denoise::{
    denoise, denoise_signal, gaussian_noise, k_sigma_noise_estimation, DenoiseConfig, NoiseModel,
    ThresholdMode, TransformVariant, Wavelet,
};

/// A smooth synthetic scene: two Gaussian blobs on a flat background.
fn scene(rows: usize, cols: usize) -> Array2<f64> {
    let blob = |i: f64, j: f64, ci: f64, cj: f64, amp: f64, width: f64| {
        amp * (-((i - ci).powi(2) + (j - cj).powi(2)) / (2.0 * width * width)).exp()
    };
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        let (i, j) = (i as f64, j as f64);
        blob(i, j, rows as f64 * 0.3, cols as f64 * 0.4, 20.0, 3.0)
            + blob(i, j, rows as f64 * 0.7, cols as f64 * 0.6, 12.0, 5.0)
    })
}

fn rms(data: &Array2<f64>) -> f64 {
    (data.iter().map(|v| v * v).sum::<f64>() / data.len() as f64).sqrt()
}

#[test]
fn denoising_improves_rms_error() {
    let clean = scene(64, 64);
    let noise = gaussian_noise((64, 64), 0.0, 1.0, Some(17)).unwrap();
    let noisy = &clean + &noise;

    let config = DenoiseConfig::new(Wavelet::from_name("b3").unwrap())
        .with_variant(TransformVariant::IsotropicUndecimated)
        .with_levels(3)
        .with_threshold_factor(3.0);
    let cleaned = denoise(&noisy, Some(1.0), &config, None).unwrap();

    let err_before = rms(&(&noisy - &clean));
    let err_after = rms(&(&cleaned - &clean));
    assert!(
        err_after < 0.8 * err_before,
        "rms before {err_before}, after {err_after}"
    );
}

#[test]
fn estimated_sigma_matches_known_noise() {
    let clean = scene(96, 96);
    let noise = gaussian_noise((96, 96), 0.0, 2.0, Some(23)).unwrap();
    let noisy = &clean + &noise;
    let sigma = k_sigma_noise_estimation(&noisy).unwrap();
    assert!(sigma > 1.5 && sigma < 2.5, "sigma = {sigma}");
}

#[test]
fn denoise_without_sigma_estimates_it() {
    let clean = scene(64, 64);
    let noise = gaussian_noise((64, 64), 0.0, 1.0, Some(31)).unwrap();
    let noisy = &clean + &noise;

    let config = DenoiseConfig::new(Wavelet::from_name("haar").unwrap()).with_levels(2);
    let cleaned = denoise(&noisy, None, &config, None).unwrap();
    let err_before = rms(&(&noisy - &clean));
    let err_after = rms(&(&cleaned - &clean));
    assert!(err_after < err_before);
}

#[test]
fn hard_threshold_monotonicity() {
    // Raising the factor never retains more non-zero detail coefficients.
    let noisy = gaussian_noise((48, 48), 0.0, 1.0, Some(41)).unwrap();
    let base = DenoiseConfig::new(Wavelet::from_name("haar").unwrap()).with_levels(2);
    let transform = base.transform_config();

    let mut previous = usize::MAX;
    for factor in [0.5, 1.0, 2.0, 4.0] {
        let config = base.clone().with_threshold_factor(factor);
        let model = NoiseModel::estimate(&config, noisy.dim(), Some(0)).unwrap();
        let dec = wisp_wavelet::decompose2(&noisy, &transform, None).unwrap();
        let thresholded = dec
            .map_planes(|i, plane| {
                let t = factor * model.sigmas()[i];
                plane.mapv(|v| if v.abs() < t { 0.0 } else { v })
            })
            .unwrap();
        let survivors: usize = thresholded
            .planes()
            .map(|p| p.iter().filter(|v| **v != 0.0).count())
            .sum();
        assert!(
            survivors <= previous,
            "factor {factor}: {survivors} > {previous}"
        );
        previous = survivors;
    }
}

#[test]
fn soft_mode_shrinks_harder_than_hard_mode() {
    let clean = scene(48, 48);
    let noise = gaussian_noise((48, 48), 0.0, 1.0, Some(53)).unwrap();
    let noisy = &clean + &noise;

    let hard = DenoiseConfig::new(Wavelet::from_name("haar").unwrap())
        .with_levels(2)
        .with_threshold_factor(3.0);
    let soft = hard.clone().with_mode(ThresholdMode::Soft);

    let out_hard = denoise(&noisy, Some(1.0), &hard, None).unwrap();
    let out_soft = denoise(&noisy, Some(1.0), &soft, None).unwrap();

    // Soft shrinkage removes strictly more detail energy.
    let residual_hard = rms(&(&noisy - &out_hard));
    let residual_soft = rms(&(&noisy - &out_soft));
    assert!(
        residual_soft > residual_hard,
        "soft {residual_soft} vs hard {residual_hard}"
    );
}

#[test]
fn signal_pipeline_preserves_structure() {
    let clean: Vec<f64> = (0..512)
        .map(|i| 10.0 * ((i as f64) * std::f64::consts::TAU / 128.0).sin())
        .collect();
    let noise = wisp_denoise::gaussian_noise_1d(512, 0.0, 1.0, Some(67)).unwrap();
    let noisy: Vec<f64> = clean.iter().zip(&noise).map(|(c, n)| c + n).collect();

    let config = DenoiseConfig::new(Wavelet::from_name("db2").unwrap())
        .with_levels(3)
        .with_threshold_factor(3.0);
    let cleaned = denoise_signal(&noisy, Some(1.0), &config, None).unwrap();

    let rms1 = |v: &[f64]| (v.iter().map(|x| x * x).sum::<f64>() / v.len() as f64).sqrt();
    let err_before: Vec<f64> = noisy.iter().zip(&clean).map(|(a, b)| a - b).collect();
    let err_after: Vec<f64> = cleaned.iter().zip(&clean).map(|(a, b)| a - b).collect();
    assert!(rms1(&err_after) < 0.8 * rms1(&err_before));
}

#[test]
fn deterministic_for_fixed_seeds() {
    let noisy = gaussian_noise((32, 32), 0.0, 1.0, Some(71)).unwrap();
    let config = DenoiseConfig::new(Wavelet::from_name("haar").unwrap()).with_levels(2);
    let a = denoise(&noisy, Some(1.0), &config, None).unwrap();
    let b = denoise(&noisy, Some(1.0), &config, None).unwrap();
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
}
