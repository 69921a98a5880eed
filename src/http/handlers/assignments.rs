use crate::domain::experiment::TrafficSplit;
use crate::experiments::assigner::assign_variation;
use crate::http::bad_request;
use axum::response::IntoResponse;
use axum::Json;

#[derive(Debug, serde::Deserialize)]
pub struct AssignRequest {
    pub visitor_id: String,
    pub experiment_id: String,
    pub traffic_split: TrafficSplit,
}

pub async fn assign(Json(req): Json<AssignRequest>) -> impl IntoResponse {
    if let Err(e) = req.traffic_split.validate() {
        return bad_request(e);
    }

    let assignment = assign_variation(&req.visitor_id, &req.experiment_id, &req.traffic_split);
    tracing::debug!(
        experiment_id = %req.experiment_id,
        variation = %assignment.variation_id,
        bucket = assignment.bucket,
        "assigned visitor"
    );
    (axum::http::StatusCode::OK, Json(assignment)).into_response()
}
