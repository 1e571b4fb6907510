use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

use crate::errors::SubmissionError;
use crate::form_models::SubmitResponse;
use crate::storage::SubmissionStore;
use crate::submission;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Where submissions are stored.
    pub store: Arc<dyn SubmissionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "desirability-form-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /submit
///
/// Stores one desirability survey submission.
///
/// The body is read raw so that empty or invalid JSON is reported with the
/// same `{"success": false, "error": ...}` shape as every other failure.
///
/// # Returns
///
/// * `Result<Json<SubmitResponse>, SubmissionError>` - 200 with a success flag, or the mapped error.
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, SubmissionError> {
    tracing::info!("POST /submit - {} bytes", body.len());

    let confirmation = submission::submit(state.store.as_ref(), &body).await?;

    tracing::info!(
        "Submission accepted (record id={})",
        confirmation.record_id
    );
    Ok(Json(SubmitResponse::submitted()))
}
