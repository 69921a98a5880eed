use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use experiment_engine::config::AppConfig;
use experiment_engine::domain::experiment::{SampleObservation, TrafficSplit};
use experiment_engine::http::handlers::assignments::{assign, AssignRequest};
use experiment_engine::http::handlers::experiments::report;
use experiment_engine::http::handlers::stats::{
    bayesian, duration, sample_size, significance, uplift, BayesianRequest, DurationRequest,
    SampleSizeRequest, TwoSampleRequest, UpliftRequest,
};
use experiment_engine::http::routes::router;
use experiment_engine::AppState;

fn state() -> AppState {
    AppState {
        config: AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            monte_carlo_samples: 2_000,
            min_samples: 100,
            confidence_level: 0.95,
            rng_seed: Some(17),
        },
    }
}

async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn two(c1: u64, n1: u64, c2: u64, n2: u64) -> TwoSampleRequest {
    TwoSampleRequest {
        control: SampleObservation::new(c1, n1),
        treatment: SampleObservation::new(c2, n2),
    }
}

#[test]
fn router_builds() {
    let _app = router(state());
}

#[tokio::test]
async fn assignment_endpoint_returns_variation() {
    let req = AssignRequest {
        visitor_id: "visitor-1".to_string(),
        experiment_id: "exp-1".to_string(),
        traffic_split: TrafficSplit::from_pairs(&[("A", 50), ("B", 50)]),
    };
    let resp = assign(Json(req)).await.into_response();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let variation = body["variation_id"].as_str().unwrap();
    assert!(variation == "A" || variation == "B");
}

#[tokio::test]
async fn assignment_rejects_empty_split() {
    let req = AssignRequest {
        visitor_id: "visitor-1".to_string(),
        experiment_id: "exp-1".to_string(),
        traffic_split: TrafficSplit::default(),
    };
    let resp = assign(Json(req)).await.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assignment_rejects_split_not_summing_to_100() {
    let req = AssignRequest {
        visitor_id: "visitor-1".to_string(),
        experiment_id: "exp-1".to_string(),
        traffic_split: TrafficSplit::from_pairs(&[("A", 50), ("B", 40)]),
    };
    let resp = assign(Json(req)).await.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("90"));
}

#[tokio::test]
async fn significance_rejects_conversions_above_exposures() {
    let resp = significance(Json(two(20, 10, 5, 10))).await.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn significance_reports_p_value() {
    let resp = significance(Json(two(100, 1000, 150, 1000))).await.into_response();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["p_value"].as_f64().unwrap() < 0.01);
    assert_eq!(body["is_significant"], serde_json::json!(true));
}

#[tokio::test]
async fn sample_size_validates_baseline() {
    let req = SampleSizeRequest {
        baseline_rate: 1.5,
        minimum_detectable_effect: 0.1,
        alpha: None,
        beta: None,
    };
    let resp = sample_size(Json(req)).await.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duration_defaults_to_even_split() {
    let req = DurationRequest {
        sample_size: 1000,
        daily_visitors: 100.0,
        traffic_split: None,
    };
    let resp = duration(Json(req)).await.into_response();
    let body = body_json(resp).await;
    assert_eq!(body["days"], serde_json::json!(20));
}

#[tokio::test]
async fn uplift_flags_unbounded_change() {
    let req = UpliftRequest {
        baseline_rate: 0.0,
        test_rate: 0.05,
    };
    let resp = uplift(Json(req)).await.into_response();
    let body = body_json(resp).await;
    assert_eq!(body["unbounded"], serde_json::json!(true));
    assert!(body["uplift_percent"].is_null());
}

#[tokio::test]
async fn bayesian_uses_configured_seed() {
    let make = || BayesianRequest {
        control: SampleObservation::new(100, 1000),
        treatment: SampleObservation::new(150, 1000),
        prior_alpha: None,
        prior_beta: None,
        samples: None,
        seed: None,
    };
    let first = body_json(bayesian(State(state()), Json(make())).await.into_response()).await;
    let second = body_json(bayesian(State(state()), Json(make())).await.into_response()).await;
    assert_eq!(first, second);
    assert_eq!(first["samples"], serde_json::json!(2_000));
    assert!(first["probability_treatment_wins"].as_f64().unwrap() > 0.99);
}

#[tokio::test]
async fn bayesian_rejects_non_positive_prior() {
    let req = BayesianRequest {
        control: SampleObservation::new(1, 10),
        treatment: SampleObservation::new(2, 10),
        prior_alpha: Some(0.0),
        prior_beta: None,
        samples: None,
        seed: None,
    };
    let resp = bayesian(State(state()), Json(req)).await.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn report_endpoint_picks_winner() {
    let resp = report(State(state()), Json(two(900, 1000, 970, 1000))).await.into_response();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["winner"], serde_json::json!("treatment"));
    assert_eq!(body["recommendation"], serde_json::json!("promote treatment"));
}

#[tokio::test]
async fn assignment_rejects_wrapping_split() {
    let req = AssignRequest {
        visitor_id: "visitor-1".to_string(),
        experiment_id: "exp-1".to_string(),
        traffic_split: TrafficSplit::from_pairs(&[("A", u32::MAX), ("B", 101)]),
    };
    let resp = assign(Json(req)).await.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bayesian_rejects_sample_count_above_limit() {
    let req = BayesianRequest {
        control: SampleObservation::new(1, 10),
        treatment: SampleObservation::new(2, 10),
        prior_alpha: None,
        prior_beta: None,
        samples: Some(u32::MAX),
        seed: None,
    };
    let resp = bayesian(State(state()), Json(req)).await.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn significance_distinguishes_infinite_uplift_from_missing() {
    let infinite = body_json(significance(Json(two(0, 100, 5, 100))).await.into_response()).await;
    assert!(infinite["uplift"].is_null());
    assert_eq!(infinite["uplift_unbounded"], serde_json::json!(true));

    let missing = body_json(significance(Json(two(0, 0, 5, 100))).await.into_response()).await;
    assert!(missing["uplift"].is_null());
    assert_eq!(missing["uplift_unbounded"], serde_json::json!(false));

    let finite = body_json(significance(Json(two(100, 1000, 150, 1000))).await.into_response()).await;
    assert!((finite["uplift"].as_f64().unwrap() - 50.0).abs() < 1e-9);
    assert_eq!(finite["uplift_unbounded"], serde_json::json!(false));
}
