//! Beta-Binomial win probability by Monte Carlo.
//!
//! The samplers take any `rand::Rng` so callers choose between a seeded
//! generator (reproducible reports, tests) and fresh thread-local entropy.

use crate::domain::experiment::{BetaPrior, SampleObservation};
use rand::rngs::StdRng;
use rand::{thread_rng, Rng, SeedableRng};

pub const DEFAULT_MONTE_CARLO_SAMPLES: u32 = 10_000;
/// Upper bound on draws accepted from callers and configuration.
pub const MAX_MONTE_CARLO_SAMPLES: u32 = 1_000_000;

const MIN_SHAPE: f64 = 0.001;

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Box-Muller standard normal draw.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen() is in [0, 1); flip it so ln() never sees 0.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// `Gamma(shape, 1)` draw via Marsaglia-Tsang.
pub fn gamma<R: Rng + ?Sized>(rng: &mut R, shape: f64) -> f64 {
    let shape = if shape.is_finite() { shape.max(MIN_SHAPE) } else { MIN_SHAPE };

    if shape < 1.0 {
        let u: f64 = 1.0 - rng.gen::<f64>();
        return gamma(rng, shape + 1.0) * u.powf(1.0 / shape);
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    loop {
        let x = standard_normal(rng);
        let v = 1.0 + c * x;
        if v <= 0.0 {
            continue;
        }
        let v = v * v * v;
        let u: f64 = 1.0 - rng.gen::<f64>();

        if u < 1.0 - 0.0331 * x.powi(4) {
            return d * v;
        }
        if u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
}

/// `Beta(alpha, beta)` draw as `X / (X + Y)` over two gamma draws.
pub fn beta<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64) -> f64 {
    let x = gamma(rng, alpha);
    let y = gamma(rng, beta);
    let total = x + y;
    if total > 0.0 {
        x / total
    } else {
        0.5
    }
}

fn posterior(sample: SampleObservation, prior: BetaPrior) -> (f64, f64) {
    (
        prior.alpha + sample.conversions as f64,
        prior.beta + sample.non_conversions() as f64,
    )
}

/// Estimates `P(rate_treatment > rate_control)` from `samples` paired
/// posterior draws. Zero samples returns 0.5.
pub fn probability_b_beats_a<R: Rng + ?Sized>(
    rng: &mut R,
    control: SampleObservation,
    treatment: SampleObservation,
    prior: BetaPrior,
    samples: u32,
) -> f64 {
    if samples == 0 {
        return 0.5;
    }

    let (a_alpha, a_beta) = posterior(control, prior);
    let (b_alpha, b_beta) = posterior(treatment, prior);

    let mut wins = 0_u32;
    for _ in 0..samples {
        let a = beta(rng, a_alpha, a_beta);
        let b = beta(rng, b_alpha, b_beta);
        if b > a {
            wins += 1;
        }
    }

    wins as f64 / samples as f64
}

/// Unseeded convenience: thread-local randomness and the default sample
/// count. Repeated calls differ by Monte Carlo noise (about 1%).
pub fn bayesian_probability(
    control: SampleObservation,
    treatment: SampleObservation,
    prior: BetaPrior,
) -> f64 {
    probability_b_beats_a(
        &mut thread_rng(),
        control,
        treatment,
        prior,
        DEFAULT_MONTE_CARLO_SAMPLES,
    )
}
