use crate::errors::SubmissionError;
use crate::form_models::{Confirmation, FormResponseRecord, PersonalInfo, SubmissionRequest};
use crate::mapping::build_record;
use crate::storage::{SubmissionStore, SubmissionTransaction};

/// Parses the raw body into a [`SubmissionRequest`].
pub fn parse_payload(body: &[u8]) -> Result<SubmissionRequest, SubmissionError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(SubmissionError::MalformedPayload(
            "request body is empty".to_string(),
        ));
    }

    serde_json::from_slice(body).map_err(|e| SubmissionError::MalformedPayload(e.to_string()))
}

/// Handles one survey submission end to end.
///
/// Flow:
/// 1. Parse the body (`personalInfo` and `responses` must be objects).
/// 2. Validate the six required personal fields.
/// 3. Build the row: truncate personal fields, flatten the answer groups.
/// 4. In one transaction: reject if email or phone is already stored, insert, commit.
///
/// Store failures roll the transaction back before returning. A uniqueness
/// violation raised by the store itself is reported as a duplicate, which
/// covers two concurrent submissions that both passed the pre-check.
pub async fn submit(
    store: &dyn SubmissionStore,
    body: &[u8],
) -> Result<Confirmation, SubmissionError> {
    let request = parse_payload(body).inspect_err(|e| {
        tracing::warn!("Rejected submission ({} bytes): {}", body.len(), e);
    })?;
    let shape = request.shape();
    tracing::debug!("Received submission: {}", shape);

    store_request(store, &request).await.inspect_err(|e| {
        if e.status_code().is_server_error() {
            tracing::error!("Submission failed for {}: {}", shape, e);
        } else {
            tracing::warn!("Rejected submission {}: {}", shape, e);
        }
    })
}

async fn store_request(
    store: &dyn SubmissionStore,
    request: &SubmissionRequest,
) -> Result<Confirmation, SubmissionError> {
    let info = PersonalInfo::from_map(&request.personal_info)
        .map_err(SubmissionError::MissingRequiredField)?;

    let record = build_record(&info, &request.responses);

    let mut tx = store.begin().await?;
    match insert_unique(tx.as_mut(), &record).await {
        Ok(record_id) => {
            tx.commit().await?;
            tracing::info!("Stored form response id={}", record_id);
            Ok(Confirmation { record_id })
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Rollback failed after '{}': {}", e, rollback_err);
            }
            Err(e)
        }
    }
}

/// Duplicate check followed by the insert, on the caller's transaction.
async fn insert_unique(
    tx: &mut dyn SubmissionTransaction,
    record: &FormResponseRecord,
) -> Result<i64, SubmissionError> {
    if let Some(existing_id) = tx.find_existing(&record.email, &record.phone).await? {
        tracing::debug!("Email or phone already used by id={}", existing_id);
        return Err(SubmissionError::DuplicateSubmission);
    }

    Ok(tx.insert(record).await?)
}
