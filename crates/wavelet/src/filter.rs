//! Wavelet filter bundles and the name registry.

use crate::error::WaveletError;

/// Haar / db1 scaling coefficients.
const HAAR: [f64; 2] = [std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2];

/// Daubechies scaling coefficients, lowest-order tap first.
const DB2: [f64; 4] = [
    -0.129_409_522_550_921_45,
    0.224_143_868_041_857_35,
    0.836_516_303_737_807_9,
    0.482_962_913_144_690_25,
];
const DB3: [f64; 6] = [
    0.035_226_291_882_100_656,
    -0.085_441_273_882_241_49,
    -0.135_011_020_010_390_84,
    0.459_877_502_119_331_3,
    0.806_891_509_313_338_8,
    0.332_670_552_950_956_9,
];
const DB4: [f64; 8] = [
    -0.010_597_401_784_997_278,
    0.032_883_011_666_982_945,
    0.030_841_381_835_986_965,
    -0.187_034_811_718_881_14,
    -0.027_983_769_416_983_85,
    0.630_880_767_929_590_4,
    0.714_846_570_552_541_5,
    0.230_377_813_308_855_23,
];

/// Symlet sym4 scaling coefficients.
const SYM4: [f64; 8] = [
    -0.075_765_714_789_273_33,
    -0.029_635_527_645_998_51,
    0.497_618_667_632_015_45,
    0.803_738_751_805_916_1,
    0.297_857_795_605_277_36,
    -0.099_219_543_576_847_22,
    -0.012_603_967_262_037_833,
    0.032_223_100_604_042_7,
];

/// Coiflet coif1 scaling coefficients.
const COIF1: [f64; 6] = [
    -0.015_655_728_135_464_54,
    -0.072_732_619_512_853_9,
    0.384_864_846_864_202_86,
    0.852_572_020_212_255_4,
    0.337_897_662_457_809_2,
    -0.072_732_619_512_853_9,
];

/// Triangle smoothing kernel (lowpass only, sums to 1).
const TRI: [f64; 3] = [0.25, 0.5, 0.25];

/// Cubic B-spline smoothing kernel (lowpass only, sums to 1).
const B3: [f64; 5] = [
    1.0 / 16.0,
    4.0 / 16.0,
    6.0 / 16.0,
    4.0 / 16.0,
    1.0 / 16.0,
];

/// A wavelet filter bundle: decomposition and reconstruction pairs.
///
/// Built once at configuration time through [`Wavelet::from_name`]; the
/// highpass and reconstruction filters are derived from the decomposition
/// lowpass by the quadrature mirror relations, never per transform call.
/// For the orthogonal families the four filters satisfy perfect
/// reconstruction; the smoothing kernels (`tri`, `b3`) are normalized
/// lowpass filters used by the additive isotropic schemes.
#[derive(Clone, Debug, PartialEq)]
pub struct Wavelet {
    name: String,
    lo_d: Vec<f64>,
    hi_d: Vec<f64>,
    lo_r: Vec<f64>,
    hi_r: Vec<f64>,
}

impl Wavelet {
    /// Builds the bundle from a decomposition lowpass via the quadrature
    /// mirror relations.
    fn from_lowpass(name: &str, lo_d: &[f64]) -> Self {
        let m = lo_d.len();
        let hi_d: Vec<f64> = (0..m)
            .map(|k| {
                let sign = if k % 2 == 0 { -1.0 } else { 1.0 };
                sign * lo_d[m - 1 - k]
            })
            .collect();
        let lo_r: Vec<f64> = lo_d.iter().rev().copied().collect();
        let hi_r: Vec<f64> = hi_d.iter().rev().copied().collect();
        Self {
            name: name.to_string(),
            lo_d: lo_d.to_vec(),
            hi_d,
            lo_r,
            hi_r,
        }
    }

    /// Resolves a wavelet from a case-insensitive name string.
    ///
    /// # Supported Names
    ///
    /// | Input | Family | Length |
    /// |-------|--------|--------|
    /// | `"haar"`, `"db1"` | Haar | 2 |
    /// | `"db2"` | Daubechies | 4 |
    /// | `"db3"` | Daubechies | 6 |
    /// | `"db4"` | Daubechies | 8 |
    /// | `"sym4"` | Symlet | 8 |
    /// | `"coif1"` | Coiflet | 6 |
    /// | `"tri"` | Triangle smoothing | 3 |
    /// | `"b3"` | Cubic B-spline smoothing | 5 |
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::UnknownWavelet`] if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, WaveletError> {
        let key = name.to_lowercase();
        let lo_d: &[f64] = match key.as_str() {
            "haar" | "db1" => &HAAR,
            "db2" => &DB2,
            "db3" => &DB3,
            "db4" => &DB4,
            "sym4" => &SYM4,
            "coif1" => &COIF1,
            "tri" => &TRI,
            "b3" => &B3,
            _ => return Err(WaveletError::UnknownWavelet(name.to_string())),
        };
        Ok(Self::from_lowpass(&key, lo_d))
    }

    /// Returns the registry name the bundle was resolved from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the filter length (number of taps).
    pub fn len(&self) -> usize {
        self.lo_d.len()
    }

    /// Returns `true` if the filter has no taps (never the case for
    /// registry wavelets).
    pub fn is_empty(&self) -> bool {
        self.lo_d.is_empty()
    }

    /// Returns the decomposition lowpass filter.
    pub fn lo_d(&self) -> &[f64] {
        &self.lo_d
    }

    /// Returns the decomposition highpass filter.
    pub fn hi_d(&self) -> &[f64] {
        &self.hi_d
    }

    /// Returns the reconstruction lowpass filter.
    pub fn lo_r(&self) -> &[f64] {
        &self.lo_r
    }

    /// Returns the reconstruction highpass filter.
    pub fn hi_r(&self) -> &[f64] {
        &self.hi_r
    }
}
