use crate::experiments::analyzer::analyze;
use crate::http::handlers::stats::TwoSampleRequest;
use crate::http::bad_request;
use crate::stats::bayesian::seeded_rng;
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn report(
    State(state): State<AppState>,
    Json(req): Json<TwoSampleRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.control.validate().and_then(|_| req.treatment.validate()) {
        return bad_request(e);
    }

    let settings = state.config.analyzer_settings();
    let seed = state.config.rng_seed;
    let (control, treatment) = (req.control, req.treatment);

    let joined = tokio::task::spawn_blocking(move || {
        let mut rng = seeded_rng(seed);
        analyze(control, treatment, &settings, &mut rng)
    })
    .await;

    match joined {
        Ok(report) => (axum::http::StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            tracing::warn!("report task failed: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}
