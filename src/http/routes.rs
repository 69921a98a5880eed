use crate::http::handlers::{assignments, experiments, ops, stats};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn router(state: AppState) -> Router {
    let stats_routes = Router::new()
        .route("/significance", post(stats::significance))
        .route("/confidence-interval", post(stats::confidence_interval))
        .route("/sample-size", post(stats::sample_size))
        .route("/duration", post(stats::duration))
        .route("/uplift", post(stats::uplift))
        .route("/chi-square", post(stats::chi_square))
        .route("/power", post(stats::power))
        .route("/bayesian", post(stats::bayesian));

    Router::new()
        .route("/health", get(ops::health))
        .route("/ops/liveness", get(ops::liveness))
        .route("/assignments", post(assignments::assign))
        .route("/experiments/report", post(experiments::report))
        .nest("/stats", stats_routes)
        .with_state(state)
}
