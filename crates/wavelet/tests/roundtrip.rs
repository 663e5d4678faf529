//! End-to-end transform round-trips across wavelets, boundaries, variants,
//! and signal parities.

use approx::assert_abs_diff_eq;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wisp_wavelet::{
    convolve, decompose, decompose2, downsample, reconstruct, reconstruct2, upsample,
    BoundaryMode, CancelToken, ConvMode, TransformConfig, TransformVariant, Wavelet,
};

const ORTHOGONAL: [&str; 6] = ["haar", "db2", "db3", "db4", "sym4", "coif1"];
const BOUNDARIES: [BoundaryMode; 3] = [
    BoundaryMode::Zero,
    BoundaryMode::Symmetric,
    BoundaryMode::Periodic,
];

fn noisy_signal(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| (i as f64 * 0.23).sin() + rng.random_range(-0.5..0.5))
        .collect()
}

fn noisy_image(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        ((i as f64) * 0.31).cos() * ((j as f64) * 0.17).sin() + rng.random_range(-0.2..0.2)
    })
}

fn assert_roundtrip(signal: &[f64], config: &TransformConfig, tol: f64) {
    let dec = decompose(signal, config, None).unwrap();
    let rec = reconstruct(&dec, config, None).unwrap();
    assert_eq!(rec.len(), signal.len());
    for (i, (r, e)) in rec.iter().zip(signal.iter()).enumerate() {
        assert!(
            (r - e).abs() < tol,
            "wavelet {} variant {:?} boundary {:?} n {} index {}: {} vs {}",
            config.wavelet().name(),
            config.variant(),
            config.boundary(),
            signal.len(),
            i,
            r,
            e
        );
    }
}

#[test]
fn decimated_roundtrips() {
    for (w, name) in ORTHOGONAL.into_iter().enumerate() {
        let wavelet = Wavelet::from_name(name).unwrap();
        for boundary in BOUNDARIES {
            for n in [32, 33] {
                let signal = noisy_signal(n, 11 + w as u64);
                let max = TransformVariant::Decimated.max_level(n, wavelet.len());
                for levels in 1..=max.min(3) {
                    let config = TransformConfig::new(wavelet.clone())
                        .with_boundary(boundary)
                        .with_levels(levels);
                    assert_roundtrip(&signal, &config, 1e-9);
                }
            }
        }
    }
}

#[test]
fn undecimated_roundtrips() {
    for name in ORTHOGONAL {
        let wavelet = Wavelet::from_name(name).unwrap();
        for boundary in BOUNDARIES {
            for n in [40, 41] {
                let signal = noisy_signal(n, 7);
                let max = TransformVariant::Undecimated.max_level(n, wavelet.len());
                for levels in 1..=max.min(3) {
                    let config = TransformConfig::new(wavelet.clone())
                        .with_variant(TransformVariant::Undecimated)
                        .with_boundary(boundary)
                        .with_levels(levels);
                    assert_roundtrip(&signal, &config, 1e-9);
                }
            }
        }
    }
}

#[test]
fn additive_roundtrips() {
    for smoothing in ["tri", "b3"] {
        let wavelet = Wavelet::from_name(smoothing).unwrap();
        for variant in [
            TransformVariant::IsotropicUndecimated,
            TransformVariant::PyramidDifference,
        ] {
            for boundary in BOUNDARIES {
                for n in [48, 49] {
                    let signal = noisy_signal(n, 3);
                    let config = TransformConfig::new(wavelet.clone())
                        .with_variant(variant)
                        .with_boundary(boundary)
                        .with_levels(2);
                    assert_roundtrip(&signal, &config, 1e-10);
                }
            }
        }
    }
}

#[test]
fn haar_symmetric_concrete_scenario() {
    // One decimated Haar level over the symmetric ramp [1,2,3,4,4,3,2,1]:
    // both bands carry floor((8 + 2 - 1) / 2) = 4 coefficients and the
    // reconstruction is exact.
    let signal = [1.0, 2.0, 3.0, 4.0, 4.0, 3.0, 2.0, 1.0];
    let config = TransformConfig::new(Wavelet::from_name("haar").unwrap())
        .with_boundary(BoundaryMode::Symmetric)
        .with_levels(1);
    let dec = decompose(&signal, &config, None).unwrap();
    assert_eq!(dec.detail(0).unwrap().len(), 4);
    assert_eq!(dec.approx().len(), 4);

    // Pairwise averages scaled by sqrt(2).
    let r = std::f64::consts::SQRT_2;
    let expected_approx = [3.0 / r, 7.0 / r, 7.0 / r, 3.0 / r];
    for (a, e) in dec.approx().iter().zip(expected_approx.iter()) {
        assert_abs_diff_eq!(a, e, epsilon = 1e-12);
    }

    let rec = reconstruct(&dec, &config, None).unwrap();
    for (rv, e) in rec.iter().zip(signal.iter()) {
        assert_abs_diff_eq!(rv, e, epsilon = 1e-12);
    }
}

#[test]
fn haar_odd_length_artifact_is_trimmed() {
    let signal = [1.0, 2.0, 3.0, 4.0, 5.0];
    let config = TransformConfig::new(Wavelet::from_name("haar").unwrap())
        .with_boundary(BoundaryMode::Symmetric)
        .with_levels(1);
    let dec = decompose(&signal, &config, None).unwrap();
    assert_eq!(dec.detail(0).unwrap().len(), 3);
    let rec = reconstruct(&dec, &config, None).unwrap();
    assert_eq!(rec.len(), 5);
    for (rv, e) in rec.iter().zip(signal.iter()) {
        assert_abs_diff_eq!(rv, e, epsilon = 1e-12);
    }
}

#[test]
fn resampler_inverse_law() {
    let mut rng = StdRng::seed_from_u64(99);
    let x: Vec<f64> = (0..25).map(|_| rng.random_range(-10.0..10.0)).collect();
    for factor in 1..=5 {
        let restored = downsample(&upsample(&x, factor, 0, false), factor, 0);
        assert_eq!(restored, x, "factor {factor}");
    }
}

#[test]
fn full_convolution_zero_boundary_reference() {
    // Direct zero-padded convolution computed the long way.
    let signal = noisy_signal(17, 5);
    let kernel = [0.3, -0.8, 0.1, 0.4];
    let out = convolve(&signal, &kernel, ConvMode::Full, BoundaryMode::Zero).unwrap();
    assert_eq!(out.len(), signal.len() + kernel.len() - 1);
    for (k, o) in out.iter().enumerate() {
        let mut expected = 0.0;
        for (i, &s) in signal.iter().enumerate() {
            for (j, &g) in kernel.iter().enumerate() {
                if i + j == k {
                    expected += s * g;
                }
            }
        }
        assert_abs_diff_eq!(o, &expected, epsilon = 1e-12);
    }
}

#[test]
fn image_roundtrips_all_variants() {
    let image = noisy_image(18, 22, 42);
    let cases = [
        ("db2", TransformVariant::Decimated),
        ("haar", TransformVariant::Undecimated),
        ("b3", TransformVariant::IsotropicUndecimated),
        ("b3", TransformVariant::PyramidDifference),
    ];
    for (name, variant) in cases {
        let config = TransformConfig::new(Wavelet::from_name(name).unwrap())
            .with_variant(variant)
            .with_levels(2);
        let dec = decompose2(&image, &config, None).unwrap();
        let rec = reconstruct2(&dec, &config, None).unwrap();
        assert_eq!(rec.dim(), image.dim());
        for (r, e) in rec.iter().zip(image.iter()) {
            assert!(
                (r - e).abs() < 1e-9,
                "variant {variant:?}: {r} vs {e}"
            );
        }
    }
}

#[test]
fn cancellation_mid_pipeline() {
    let signal = noisy_signal(64, 1);
    let config = TransformConfig::new(Wavelet::from_name("haar").unwrap()).with_levels(3);

    let token = CancelToken::new();
    let dec = decompose(&signal, &config, Some(&token)).unwrap();

    token.cancel();
    assert!(matches!(
        decompose(&signal, &config, Some(&token)),
        Err(wisp_wavelet::WaveletError::Cancelled)
    ));
    assert!(matches!(
        reconstruct(&dec, &config, Some(&token)),
        Err(wisp_wavelet::WaveletError::Cancelled)
    ));
}

#[test]
fn decomposition_detail_order_is_finest_first() {
    let signal = noisy_signal(64, 2);
    let config = TransformConfig::new(Wavelet::from_name("haar").unwrap()).with_levels(3);
    let dec = decompose(&signal, &config, None).unwrap();
    let lens: Vec<usize> = dec.details().map(|d| d.len()).collect();
    assert_eq!(lens, vec![32, 16, 8]);
    assert_eq!(dec.approx().len(), 8);
}
