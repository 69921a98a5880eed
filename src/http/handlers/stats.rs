use crate::domain::experiment::{
    require_positive, require_unit_interval, BetaPrior, SampleObservation, ValidationError,
};
use crate::http::bad_request;
use crate::stats::{bayesian, frequentist};
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

#[derive(Debug, serde::Deserialize)]
pub struct TwoSampleRequest {
    pub control: SampleObservation,
    pub treatment: SampleObservation,
}

impl TwoSampleRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        self.control.validate()?;
        self.treatment.validate()
    }
}

pub async fn significance(Json(req): Json<TwoSampleRequest>) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return bad_request(e);
    }
    let result = frequentist::significance_result(req.control, req.treatment);
    let z = frequentist::z_score(req.control, req.treatment);
    // null uplift means an arm without exposures; an infinite one is flagged.
    let uplift_unbounded = result.uplift.is_some_and(f64::is_infinite);
    let uplift = result.uplift.filter(|u| u.is_finite());
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({
            "z_score": z,
            "p_value": result.p_value,
            "is_significant": result.is_significant,
            "confidence_level": result.confidence_level,
            "uplift": uplift,
            "uplift_unbounded": uplift_unbounded,
        })),
    )
        .into_response()
}

pub async fn chi_square(Json(req): Json<TwoSampleRequest>) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return bad_request(e);
    }
    let result = frequentist::chi_square_test(req.control, req.treatment);
    (axum::http::StatusCode::OK, Json(result)).into_response()
}

#[derive(Debug, serde::Deserialize)]
pub struct IntervalRequest {
    pub conversions: u64,
    pub exposures: u64,
    pub confidence_level: Option<f64>,
}

pub async fn confidence_interval(
    State(state): State<AppState>,
    Json(req): Json<IntervalRequest>,
) -> impl IntoResponse {
    let sample = SampleObservation::new(req.conversions, req.exposures);
    if let Err(e) = sample.validate() {
        return bad_request(e);
    }
    let level = req.confidence_level.unwrap_or(state.config.confidence_level);
    let interval = frequentist::confidence_interval(req.conversions, req.exposures, level);
    (axum::http::StatusCode::OK, Json(interval)).into_response()
}

#[derive(Debug, serde::Deserialize)]
pub struct SampleSizeRequest {
    pub baseline_rate: f64,
    pub minimum_detectable_effect: f64,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
}

pub async fn sample_size(Json(req): Json<SampleSizeRequest>) -> impl IntoResponse {
    let alpha = req.alpha.unwrap_or(frequentist::DEFAULT_ALPHA);
    let beta = req.beta.unwrap_or(frequentist::DEFAULT_BETA);
    let checks = require_unit_interval("baseline_rate", req.baseline_rate)
        .and_then(|_| require_positive("minimum_detectable_effect", req.minimum_detectable_effect))
        .and_then(|_| require_unit_interval("alpha", alpha))
        .and_then(|_| require_unit_interval("beta", beta));
    if let Err(e) = checks {
        return bad_request(e);
    }

    let n = frequentist::sample_size(req.baseline_rate, req.minimum_detectable_effect, alpha, beta);
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({"sample_size_per_variation": n})),
    )
        .into_response()
}

#[derive(Debug, serde::Deserialize)]
pub struct DurationRequest {
    pub sample_size: u64,
    pub daily_visitors: f64,
    pub traffic_split: Option<f64>,
}

pub async fn duration(Json(req): Json<DurationRequest>) -> impl IntoResponse {
    let split = req.traffic_split.unwrap_or(frequentist::DEFAULT_TRAFFIC_SPLIT);
    let checks = require_positive("sample_size", req.sample_size as f64)
        .and_then(|_| require_positive("daily_visitors", req.daily_visitors))
        .and_then(|_| require_unit_interval("traffic_split", split));
    if let Err(e) = checks {
        return bad_request(e);
    }

    let days = frequentist::test_duration(req.sample_size, req.daily_visitors, split);
    (axum::http::StatusCode::OK, Json(serde_json::json!({"days": days}))).into_response()
}

#[derive(Debug, serde::Deserialize)]
pub struct UpliftRequest {
    pub baseline_rate: f64,
    pub test_rate: f64,
}

pub async fn uplift(Json(req): Json<UpliftRequest>) -> impl IntoResponse {
    let value = frequentist::uplift(req.baseline_rate, req.test_rate);
    // JSON has no infinity; report it as a flag instead.
    let unbounded = value.is_infinite();
    let uplift_percent = if unbounded { None } else { Some(value) };
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({
            "uplift_percent": uplift_percent,
            "unbounded": unbounded,
        })),
    )
        .into_response()
}

#[derive(Debug, serde::Deserialize)]
pub struct PowerRequest {
    pub sample_size: u64,
    pub baseline_rate: f64,
    pub test_rate: f64,
    pub alpha: Option<f64>,
}

pub async fn power(Json(req): Json<PowerRequest>) -> impl IntoResponse {
    let alpha = req.alpha.unwrap_or(frequentist::DEFAULT_ALPHA);
    if let Err(e) = require_unit_interval("alpha", alpha) {
        return bad_request(e);
    }
    let power = frequentist::power(req.sample_size, req.baseline_rate, req.test_rate, alpha);
    (axum::http::StatusCode::OK, Json(serde_json::json!({"power": power}))).into_response()
}

#[derive(Debug, serde::Deserialize)]
pub struct BayesianRequest {
    pub control: SampleObservation,
    pub treatment: SampleObservation,
    pub prior_alpha: Option<f64>,
    pub prior_beta: Option<f64>,
    pub samples: Option<u32>,
    pub seed: Option<u64>,
}

pub async fn bayesian(
    State(state): State<AppState>,
    Json(req): Json<BayesianRequest>,
) -> impl IntoResponse {
    let prior = BetaPrior {
        alpha: req.prior_alpha.unwrap_or(1.0),
        beta: req.prior_beta.unwrap_or(1.0),
    };
    let checks = req
        .control
        .validate()
        .and_then(|_| req.treatment.validate())
        .and_then(|_| require_positive("prior_alpha", prior.alpha))
        .and_then(|_| require_positive("prior_beta", prior.beta));
    if let Err(e) = checks {
        return bad_request(e);
    }

    let samples = req.samples.unwrap_or(state.config.monte_carlo_samples);
    if samples > bayesian::MAX_MONTE_CARLO_SAMPLES {
        return bad_request(ValidationError::TooManySamples {
            requested: samples,
            max: bayesian::MAX_MONTE_CARLO_SAMPLES,
        });
    }
    let seed = req.seed.or(state.config.rng_seed);
    let (control, treatment) = (req.control, req.treatment);

    let joined = tokio::task::spawn_blocking(move || {
        let mut rng = bayesian::seeded_rng(seed);
        bayesian::probability_b_beats_a(&mut rng, control, treatment, prior, samples)
    })
    .await;

    match joined {
        Ok(probability) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "probability_treatment_wins": probability,
                "samples": samples,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("monte carlo task failed: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}
