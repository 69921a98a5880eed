use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitEntry {
    pub variation_id: String,
    pub percent: u32,
}

/// Ordered variation -> percentage mapping. Declaration order is the order
/// buckets are walked in during assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrafficSplit {
    pub entries: Vec<SplitEntry>,
}

impl TrafficSplit {
    pub fn new(entries: Vec<SplitEntry>) -> Self {
        Self { entries }
    }

    pub fn from_pairs(pairs: &[(&str, u32)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(id, pct)| SplitEntry {
                    variation_id: id.to_string(),
                    percent: *pct,
                })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Summed in `u64` so no combination of `u32` percentages can wrap.
    pub fn total_percent(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.percent)).sum()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptySplit);
        }
        if let Some(entry) = self.entries.iter().find(|e| e.percent > 100) {
            return Err(ValidationError::PercentTooLarge {
                variation_id: entry.variation_id.clone(),
                percent: entry.percent,
            });
        }
        let total = self.total_percent();
        if total != 100 {
            return Err(ValidationError::SplitTotal(total));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationAssignment {
    pub variation_id: String,
    pub bucket: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleObservation {
    pub conversions: u64,
    pub exposures: u64,
}

impl SampleObservation {
    pub fn new(conversions: u64, exposures: u64) -> Self {
        Self {
            conversions,
            exposures,
        }
    }

    pub fn rate(&self) -> f64 {
        if self.exposures == 0 {
            0.0
        } else {
            self.conversions as f64 / self.exposures as f64
        }
    }

    pub fn non_conversions(&self) -> u64 {
        self.exposures.saturating_sub(self.conversions)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.conversions > self.exposures {
            return Err(ValidationError::ConversionsExceedExposures {
                conversions: self.conversions,
                exposures: self.exposures,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceResult {
    pub p_value: f64,
    pub is_significant: bool,
    /// `(1 - p) * 100`.
    pub confidence_level: f64,
    pub uplift: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub chi_square: f64,
    pub p_value: f64,
    pub is_significant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaPrior {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for BetaPrior {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

/// Shape errors the calling layer checks before invoking the engines.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("traffic split must declare at least one variation")]
    EmptySplit,

    #[error("traffic split percentages must sum to 100, got {0}")]
    SplitTotal(u64),

    #[error("variation {variation_id} has percentage {percent}, above 100")]
    PercentTooLarge { variation_id: String, percent: u32 },

    #[error("requested {requested} monte carlo samples, limit is {max}")]
    TooManySamples { requested: u32, max: u32 },

    #[error("conversions ({conversions}) exceed exposures ({exposures})")]
    ConversionsExceedExposures { conversions: u64, exposures: u64 },

    #[error("{name} must lie strictly between 0 and 1, got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
}

pub fn require_unit_interval(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ValidationError::RateOutOfRange { name, value })
    }
}

pub fn require_positive(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { name, value })
    }
}
