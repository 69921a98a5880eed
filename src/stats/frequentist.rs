//! Two-proportion frequentist statistics over aggregate conversion counts.
//!
//! Every function here is pure and total over its numeric domain. Sparse or
//! degenerate inputs (zero exposures, zero variance) map to "no evidence"
//! values instead of errors.

use crate::domain::experiment::{ChiSquareResult, ConfidenceInterval, SampleObservation, SignificanceResult};
use crate::stats::normal::{inverse_normal_cdf, normal_cdf, z_for_confidence};

pub const DEFAULT_ALPHA: f64 = 0.05;
pub const DEFAULT_BETA: f64 = 0.20;
pub const DEFAULT_TRAFFIC_SPLIT: f64 = 0.5;
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Pooled two-proportion z statistic, positive when treatment converts better.
///
/// Returns 0 when either arm has no exposures or the pooled standard error
/// is zero.
pub fn z_score(control: SampleObservation, treatment: SampleObservation) -> f64 {
    if control.exposures == 0 || treatment.exposures == 0 {
        return 0.0;
    }

    let n1 = control.exposures as f64;
    let n2 = treatment.exposures as f64;
    let pooled = (control.conversions + treatment.conversions) as f64 / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();

    if se == 0.0 || !se.is_finite() {
        return 0.0;
    }

    (treatment.rate() - control.rate()) / se
}

/// Two-tailed p-value of the pooled z-test. Exactly 1 when either arm has no
/// exposures.
pub fn significance(control: SampleObservation, treatment: SampleObservation) -> f64 {
    if control.exposures == 0 || treatment.exposures == 0 {
        return 1.0;
    }
    two_tailed_p(z_score(control, treatment))
}

fn two_tailed_p(z: f64) -> f64 {
    (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

pub fn significance_result(
    control: SampleObservation,
    treatment: SampleObservation,
) -> SignificanceResult {
    let p_value = significance(control, treatment);
    let uplift = if control.exposures == 0 || treatment.exposures == 0 {
        None
    } else {
        Some(uplift(control.rate(), treatment.rate()))
    };

    SignificanceResult {
        p_value,
        is_significant: p_value < SIGNIFICANCE_THRESHOLD,
        confidence_level: (1.0 - p_value) * 100.0,
        uplift,
    }
}

/// Wald interval for a single proportion, clamped to `[0, 1]`.
///
/// Confidence levels other than 0.90/0.95/0.99 use the 95% critical value.
pub fn confidence_interval(conversions: u64, exposures: u64, confidence_level: f64) -> ConfidenceInterval {
    let sample = SampleObservation::new(conversions, exposures);
    if exposures == 0 {
        return ConfidenceInterval {
            lower: 0.0,
            upper: 0.0,
        };
    }

    let p = sample.rate();
    let z = z_for_confidence(confidence_level);
    let margin = z * (p * (1.0 - p) / exposures as f64).sqrt();

    ConfidenceInterval {
        lower: (p - margin).clamp(0.0, 1.0),
        upper: (p + margin).clamp(0.0, 1.0),
    }
}

/// Per-variation sample size needed to detect a relative lift of
/// `minimum_detectable_effect` over `baseline_rate`, rounded up.
///
/// Returns `u64::MAX` when the effect is zero (never detectable).
pub fn sample_size(baseline_rate: f64, minimum_detectable_effect: f64, alpha: f64, beta: f64) -> u64 {
    let p1 = baseline_rate;
    let p2 = (baseline_rate * (1.0 + minimum_detectable_effect)).clamp(0.0, 1.0);
    let effect = p2 - p1;
    if effect == 0.0 || !effect.is_finite() {
        return u64::MAX;
    }

    let z_alpha = inverse_normal_cdf(1.0 - alpha / 2.0);
    let z_beta = inverse_normal_cdf(1.0 - beta);
    let p_bar = (p1 + p2) / 2.0;

    let null_term = z_alpha * (2.0 * p_bar * (1.0 - p_bar)).sqrt();
    let alt_term = z_beta * (p1 * (1.0 - p1) + p2 * (1.0 - p2)).sqrt();
    let n = (null_term + alt_term).powi(2) / effect.powi(2);

    if !n.is_finite() {
        return u64::MAX;
    }
    n.ceil() as u64
}

/// Days until `sample_size` visitors reach the treatment arm.
pub fn test_duration(sample_size: u64, daily_visitors: f64, traffic_split: f64) -> u64 {
    let per_day = daily_visitors * traffic_split;
    if !(per_day > 0.0) || !per_day.is_finite() {
        return u64::MAX;
    }
    (sample_size as f64 / per_day).ceil() as u64
}

/// Relative change of `test_rate` over `baseline_rate`, in percent.
///
/// A zero baseline has no finite relative change: the result is `+inf` when
/// the test rate is positive and 0 when both rates are zero.
pub fn uplift(baseline_rate: f64, test_rate: f64) -> f64 {
    if baseline_rate == 0.0 {
        return if test_rate > 0.0 { f64::INFINITY } else { 0.0 };
    }
    (test_rate - baseline_rate) / baseline_rate * 100.0
}

/// Pearson chi-square on the 2x2 variation x outcome table.
///
/// No continuity correction is applied, so the statistic equals the square
/// of [`z_score`] and the p-value matches [`significance`].
pub fn chi_square_test(control: SampleObservation, treatment: SampleObservation) -> ChiSquareResult {
    let a = control.conversions as f64;
    let b = control.non_conversions() as f64;
    let c = treatment.conversions as f64;
    let d = treatment.non_conversions() as f64;

    let row1 = a + b;
    let row2 = c + d;
    let col1 = a + c;
    let col2 = b + d;
    let denom = row1 * row2 * col1 * col2;

    if denom == 0.0 {
        return ChiSquareResult {
            chi_square: 0.0,
            p_value: 1.0,
            is_significant: false,
        };
    }

    let total = row1 + row2;
    let chi_square = total * (a * d - b * c).powi(2) / denom;
    let p_value = (1.0 - chi_square_cdf(chi_square, 1)).clamp(0.0, 1.0);

    ChiSquareResult {
        chi_square,
        p_value,
        is_significant: p_value < SIGNIFICANCE_THRESHOLD,
    }
}

/// Chi-square CDF. One degree of freedom maps exactly onto the normal CDF;
/// other degrees use the regularized lower incomplete gamma function.
pub fn chi_square_cdf(x: f64, df: u32) -> f64 {
    if !(x > 0.0) {
        return 0.0;
    }
    match df {
        0 => 1.0,
        1 => 2.0 * normal_cdf(x.sqrt()) - 1.0,
        _ => regularized_lower_gamma(df as f64 / 2.0, x / 2.0),
    }
}

/// Probability of rejecting the null at `alpha` for a true shift from
/// `baseline_rate` to `test_rate` with `sample_size` visitors per arm.
pub fn power(sample_size: u64, baseline_rate: f64, test_rate: f64, alpha: f64) -> f64 {
    let pooled = (baseline_rate + test_rate) / 2.0;
    let se = (2.0 * pooled * (1.0 - pooled) / sample_size as f64).sqrt();
    let z_alpha = inverse_normal_cdf(1.0 - alpha / 2.0);

    let effect = (test_rate - baseline_rate).abs();
    let standardized = if se > 0.0 && se.is_finite() {
        effect / se
    } else {
        0.0
    };

    normal_cdf(standardized - z_alpha).clamp(0.0, 1.0)
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // reflection
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = LANCZOS[0];
    for (i, coeff) in LANCZOS.iter().enumerate().skip(1) {
        acc += coeff / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

const GAMMA_EPS: f64 = 1e-14;
const GAMMA_MAX_ITER: usize = 500;

/// `P(a, x)`, the regularized lower incomplete gamma function.
pub fn regularized_lower_gamma(a: f64, x: f64) -> f64 {
    if !(x > 0.0) || !(a > 0.0) {
        return 0.0;
    }
    if x < a + 1.0 {
        gamma_series(a, x)
    } else {
        1.0 - gamma_continued_fraction(a, x)
    }
}

fn gamma_series(a: f64, x: f64) -> f64 {
    let mut term = 1.0 / a;
    let mut sum = term;
    let mut ap = a;
    for _ in 0..GAMMA_MAX_ITER {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * GAMMA_EPS {
            break;
        }
    }
    (sum.ln() - x + a * x.ln() - ln_gamma(a)).exp()
}

// Lentz evaluation of the upper tail Q(a, x).
fn gamma_continued_fraction(a: f64, x: f64) -> f64 {
    const TINY: f64 = 1e-300;
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=GAMMA_MAX_ITER {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < GAMMA_EPS {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}
