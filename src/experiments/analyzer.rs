use crate::domain::experiment::{BetaPrior, ChiSquareResult, ConfidenceInterval, SampleObservation};
use crate::stats::{bayesian, frequentist};
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct AnalyzerSettings {
    pub min_samples: u64,
    pub confidence_level: f64,
    pub monte_carlo_samples: u32,
    pub prior: BetaPrior,
    pub alpha: f64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            min_samples: 100,
            confidence_level: 0.95,
            monte_carlo_samples: bayesian::DEFAULT_MONTE_CARLO_SAMPLES,
            prior: BetaPrior::default(),
            alpha: frequentist::DEFAULT_ALPHA,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ExperimentReport {
    pub control_rate: f64,
    pub treatment_rate: f64,
    pub control_interval: ConfidenceInterval,
    pub treatment_interval: ConfidenceInterval,
    /// `None` when the uplift is infinite (zero control rate).
    pub uplift: Option<f64>,
    pub uplift_unbounded: bool,
    pub z_score: f64,
    pub p_value: f64,
    pub is_significant: bool,
    pub chi_square: ChiSquareResult,
    pub probability_treatment_wins: f64,
    pub observed_power: f64,
    pub winner: Option<String>,
    pub recommendation: String,
}

/// Point-in-time report over two arms. Not a stopping rule: the caller
/// decides what to do with the recommendation.
pub fn analyze<R: Rng + ?Sized>(
    control: SampleObservation,
    treatment: SampleObservation,
    settings: &AnalyzerSettings,
    rng: &mut R,
) -> ExperimentReport {
    let control_rate = control.rate();
    let treatment_rate = treatment.rate();
    let level = settings.confidence_level;
    let uplift = frequentist::uplift(control_rate, treatment_rate);

    let mut report = ExperimentReport {
        control_rate,
        treatment_rate,
        control_interval: frequentist::confidence_interval(control.conversions, control.exposures, level),
        treatment_interval: frequentist::confidence_interval(
            treatment.conversions,
            treatment.exposures,
            level,
        ),
        uplift: uplift.is_finite().then_some(uplift),
        uplift_unbounded: uplift.is_infinite(),
        z_score: 0.0,
        p_value: 1.0,
        is_significant: false,
        chi_square: ChiSquareResult {
            chi_square: 0.0,
            p_value: 1.0,
            is_significant: false,
        },
        probability_treatment_wins: 0.5,
        observed_power: 0.0,
        winner: None,
        recommendation: "insufficient sample size".to_string(),
    };

    let min = settings.min_samples.max(1);
    if control.exposures < min || treatment.exposures < min {
        tracing::debug!(
            control_exposures = control.exposures,
            treatment_exposures = treatment.exposures,
            min_samples = min,
            "skipping inference below minimum sample size"
        );
        return report;
    }

    let z = frequentist::z_score(control, treatment);
    let p = frequentist::significance(control, treatment);
    let significant = p < frequentist::SIGNIFICANCE_THRESHOLD;

    report.z_score = z;
    report.p_value = p;
    report.is_significant = significant;
    report.chi_square = frequentist::chi_square_test(control, treatment);
    report.probability_treatment_wins = bayesian::probability_b_beats_a(
        rng,
        control,
        treatment,
        settings.prior,
        settings.monte_carlo_samples,
    );
    report.observed_power = frequentist::power(
        control.exposures.min(treatment.exposures),
        control_rate,
        treatment_rate,
        settings.alpha,
    );

    report.winner = if significant {
        if treatment_rate > control_rate {
            Some("treatment".to_string())
        } else {
            Some("control".to_string())
        }
    } else {
        None
    };

    report.recommendation = match report.winner {
        Some(ref w) if w == "treatment" => "promote treatment".to_string(),
        Some(_) => "keep control".to_string(),
        None => "continue experiment".to_string(),
    };

    report
}
