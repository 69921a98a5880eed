#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub monte_carlo_samples: u32,
    pub min_samples: u64,
    pub confidence_level: f64,
    /// Unset means every Bayesian computation draws fresh entropy.
    pub rng_seed: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            monte_carlo_samples: monte_carlo_samples(parsed_var("MONTE_CARLO_SAMPLES")),
            min_samples: parsed_var("ANALYZER_MIN_SAMPLES").unwrap_or(100),
            confidence_level: parsed_var("DEFAULT_CONFIDENCE_LEVEL").unwrap_or(0.95),
            rng_seed: parsed_var("STATS_RNG_SEED"),
        }
    }

    pub fn analyzer_settings(&self) -> crate::experiments::analyzer::AnalyzerSettings {
        crate::experiments::analyzer::AnalyzerSettings {
            min_samples: self.min_samples,
            confidence_level: self.confidence_level,
            monte_carlo_samples: self.monte_carlo_samples,
            ..Default::default()
        }
    }
}

/// Falls back to the default when unset and caps at
/// [`MAX_MONTE_CARLO_SAMPLES`](crate::stats::bayesian::MAX_MONTE_CARLO_SAMPLES).
pub fn monte_carlo_samples(configured: Option<u32>) -> u32 {
    use crate::stats::bayesian::{DEFAULT_MONTE_CARLO_SAMPLES, MAX_MONTE_CARLO_SAMPLES};
    configured
        .unwrap_or(DEFAULT_MONTE_CARLO_SAMPLES)
        .min(MAX_MONTE_CARLO_SAMPLES)
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}
