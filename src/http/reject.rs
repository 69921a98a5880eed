use crate::domain::experiment::ValidationError;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub fn bad_request(e: ValidationError) -> Response {
    tracing::debug!("rejected request: {}", e);
    (
        axum::http::StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": e.to_string()})),
    )
        .into_response()
}
