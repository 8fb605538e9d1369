//! Paired significance testing for ranker comparison.
//!
//! Two rankers evaluated on the same query set produce paired observations:
//! one average-precision value each per query. The paired Student's t-test
//! works on the per-query differences, which is the standard way to compare
//! IR systems: between-query variance (easy vs. hard queries) cancels out.
//!
//! The t-distribution CDF is computed in-tree via the regularized
//! incomplete beta function (continued-fraction form), so no numerics
//! dependency is needed for a single distribution.
//!
//! # References
//!
//! - Smucker et al. (2007). "A comparison of statistical significance tests for IR evaluation"
//! - Press et al. "Numerical Recipes", §6.4 (incomplete beta function)

use crate::error::EvalError;
use serde::{Deserialize, Serialize};

/// Result of a paired two-sided t-test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TTestResult {
    /// t-statistic; positive when sample A scores higher on average.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Degrees of freedom (n - 1).
    pub df: usize,
}

impl TTestResult {
    /// Whether the difference is significant at the given alpha level.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Performs a paired two-sided Student's t-test.
///
/// `sample_a` and `sample_b` must hold per-query scores for the identical
/// query set in identical order, one matched observation per query. The
/// statistic is the mean of the per-query differences divided by the
/// standard error of that mean; the p-value comes from the t-distribution
/// with n - 1 degrees of freedom.
///
/// Swapping the samples negates the statistic and leaves the p-value
/// unchanged.
///
/// # Errors
///
/// - `InvalidInput` if the samples differ in length or hold fewer than two
///   observations.
/// - `DegenerateInput` if the differences have zero variance but a non-zero
///   mean (every query moved by exactly the same amount, no spread to
///   estimate an error from). Identical samples are *not* degenerate:
///   statistic 0.0, p-value 1.0.
pub fn paired_ttest(sample_a: &[f64], sample_b: &[f64]) -> Result<TTestResult, EvalError> {
    if sample_a.len() != sample_b.len() {
        return Err(EvalError::InvalidInput(format!(
            "paired samples must have equal length, got {} and {}",
            sample_a.len(),
            sample_b.len()
        )));
    }
    let n = sample_a.len();
    if n < 2 {
        return Err(EvalError::InvalidInput(format!(
            "paired test requires at least 2 observations, got {n}"
        )));
    }

    let df = n - 1;
    let diffs: Vec<f64> = sample_a
        .iter()
        .zip(sample_b.iter())
        .map(|(a, b)| a - b)
        .collect();

    let mean_diff = diffs.iter().sum::<f64>() / n as f64;
    let var_diff = diffs.iter().map(|d| (d - mean_diff).powi(2)).sum::<f64>() / df as f64;

    if var_diff == 0.0 {
        if mean_diff == 0.0 {
            return Ok(TTestResult {
                statistic: 0.0,
                p_value: 1.0,
                df,
            });
        }
        return Err(EvalError::DegenerateInput(format!(
            "paired differences have zero variance with non-zero mean {mean_diff}"
        )));
    }

    let std_err = (var_diff / n as f64).sqrt();
    let statistic = mean_diff / std_err;
    let p_value = student_t_two_sided_p(statistic.abs(), df);

    Ok(TTestResult {
        statistic,
        p_value,
        df,
    })
}

/// Two-sided p-value for |t| under the t-distribution with `df` degrees of
/// freedom.
///
/// Uses the identity `p = I_{df/(df + t^2)}(df/2, 1/2)` for moderate df and
/// a normal approximation beyond df = 100, where the two distributions are
/// indistinguishable at the precision we report.
fn student_t_two_sided_p(t_abs: f64, df: usize) -> f64 {
    if df > 100 {
        return 2.0 * (1.0 - normal_cdf(t_abs));
    }
    let df = df as f64;
    let x = df / (df + t_abs * t_abs);
    incomplete_beta(df / 2.0, 0.5, x)
}

/// Standard normal CDF via the error function.
fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Error function, Abramowitz & Stegun 7.1.26 (max error ~1.5e-7).
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    sign * y
}

/// Regularized incomplete beta function I_x(a, b).
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b)
        + a * x.ln()
        + b * (1.0 - x).ln())
    .exp();

    // The continued fraction converges fast for x < (a+1)/(a+b+2);
    // otherwise use the symmetry I_x(a,b) = 1 - I_{1-x}(b,a).
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Continued-fraction expansion for the incomplete beta function
/// (modified Lentz's method).
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 200;
    const EPS: f64 = 1e-12;
    const TINY: f64 = 1e-30;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

/// Natural log of the gamma function (Lanczos approximation).
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 6] = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];

    let mut tmp = x + 5.5;
    tmp -= (x + 0.5) * tmp.ln();

    let mut series = 1.000000000190015;
    for (i, &coeff) in COEFFS.iter().enumerate() {
        series += coeff / (x + 1.0 + i as f64);
    }

    -tmp + (2.5066282746310005 * series / x).ln()
}
