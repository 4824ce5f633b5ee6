use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    error::{ApiError, AppError, Operation, WithOperation},
    AppState,
};

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .inventory
        .store()
        .ping()
        .await
        .map_err(AppError::from)
        .during(Operation::Health)?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "store": "connected"
        })),
    ))
}
