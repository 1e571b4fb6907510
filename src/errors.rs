use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::form_models::RequiredField;
use crate::storage::StoreError;

/// Ways a submission can fail.
///
/// The first three are caused by the client and answered with 400; the rest
/// are server failures answered with a generic 500 message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Body absent, not JSON, or lacking the `personalInfo`/`responses` objects.
    MalformedPayload(String),
    /// Required personal fields that were absent or empty.
    MissingRequiredField(Vec<RequiredField>),
    /// Email or phone already used by a stored submission.
    DuplicateSubmission,
    /// Datastore failure; the transaction was rolled back.
    PersistenceFailure(StoreError),
    /// Anything else, e.g. a panic caught by the HTTP layer.
    UnexpectedFailure(String),
}

impl SubmissionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubmissionError::MalformedPayload(_)
            | SubmissionError::MissingRequiredField(_)
            | SubmissionError::DuplicateSubmission => StatusCode::BAD_REQUEST,
            SubmissionError::PersistenceFailure(_) | SubmissionError::UnexpectedFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the client.
    pub fn public_message(&self) -> String {
        match self {
            SubmissionError::MalformedPayload(msg) => format!("Invalid request payload: {}", msg),
            SubmissionError::MissingRequiredField(fields) => format!(
                "All personal information fields are required (missing: {})",
                join_fields(fields)
            ),
            SubmissionError::DuplicateSubmission => {
                "This email or phone number has already been used".to_string()
            }
            SubmissionError::PersistenceFailure(_) => "Database error occurred".to_string(),
            SubmissionError::UnexpectedFailure(_) => "An unexpected error occurred".to_string(),
        }
    }
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::MalformedPayload(msg) => write!(f, "Malformed payload: {}", msg),
            SubmissionError::MissingRequiredField(fields) => {
                write!(f, "Missing required fields: {}", join_fields(fields))
            }
            SubmissionError::DuplicateSubmission => write!(f, "Duplicate submission"),
            SubmissionError::PersistenceFailure(e) => write!(f, "Persistence failure: {}", e),
            SubmissionError::UnexpectedFailure(msg) => write!(f, "Unexpected failure: {}", msg),
        }
    }
}

impl std::error::Error for SubmissionError {}

impl IntoResponse for SubmissionError {
    /// Maps the error to its status code and a `{"success": false, "error": ...}` body.
    fn into_response(self) -> Response {
        // Submission failures are logged with the payload shape by `submit`;
        // only panics caught by the router reach here unlogged.
        if let SubmissionError::UnexpectedFailure(msg) = &self {
            tracing::error!("Unexpected error: {}", msg);
        }

        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

impl From<StoreError> for SubmissionError {
    /// A uniqueness violation from the store is the same outcome as the pre-check hit.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation => SubmissionError::DuplicateSubmission,
            other => SubmissionError::PersistenceFailure(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        assert_eq!(
            SubmissionError::MalformedPayload("empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SubmissionError::MissingRequiredField(vec![RequiredField::Email]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SubmissionError::DuplicateSubmission.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = SubmissionError::PersistenceFailure(StoreError::Backend(
            "password authentication failed for user root".into(),
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Database error occurred");

        let err = SubmissionError::UnexpectedFailure("index out of bounds".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "An unexpected error occurred");
    }

    #[test]
    fn test_missing_fields_named_in_message() {
        let err =
            SubmissionError::MissingRequiredField(vec![RequiredField::Name, RequiredField::Phone]);
        assert_eq!(
            err.public_message(),
            "All personal information fields are required (missing: name, phone)"
        );
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate() {
        assert_eq!(
            SubmissionError::from(StoreError::UniqueViolation),
            SubmissionError::DuplicateSubmission
        );
        assert!(matches!(
            SubmissionError::from(StoreError::Backend("timeout".into())),
            SubmissionError::PersistenceFailure(_)
        ));
    }
}
