use std::env;
use std::sync::Arc;
use uuid::Uuid;

use desirability_form_api::config::Config;
use desirability_form_api::core::errors::SubmissionError;
use desirability_form_api::core::submission::submit;
use desirability_form_api::db::Database;
use desirability_form_api::db_storage::FormResponseStorage;

fn test_config() -> anyhow::Result<Config> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some(db_url.clone()),
        _ => None,
    })
}

/// Email/phone pair that does not collide across runs.
fn unique_contact(tag: &str) -> (String, String) {
    let id = Uuid::new_v4();
    (
        format!("{}-{}@smoke.test", tag, id),
        format!("{:017}", id.as_u128() % 100_000_000_000_000_000),
    )
}

fn payload(email: &str, phone: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "personalInfo": {
            "name": "Smoke Test",
            "gender": "N/A",
            "city": "Nowhere",
            "email": email,
            "phone": phone,
            "occupation": "Tester"
        },
        "responses": {
            "weekend": {"answers": [{"value": "A"}, {"value": "B"}]}
        }
    }))
    .unwrap()
}

async fn stored_count(db: &Database, email: &str) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM desirablity_form_responses WHERE email = $1",
    )
    .bind(email)
    .fetch_one(&db.pool)
    .await?;
    Ok(count)
}

/// Integration smoke test for submissions written to Postgres.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn submit_then_duplicate_smoke_test() -> anyhow::Result<()> {
    let db = Database::new(&test_config()?).await?;
    db.ensure_schema().await?;
    let storage = FormResponseStorage::new(db.pool.clone());

    let (email, phone) = unique_contact("seq");
    submit(&storage, &payload(&email, &phone))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let stored: String = sqlx::query_scalar(
        "SELECT weekend_options FROM desirablity_form_responses WHERE email = $1",
    )
    .bind(&email)
    .fetch_one(&db.pool)
    .await?;
    assert_eq!(stored, "A,B");

    let again = submit(&storage, &payload(&email, "0")).await;
    assert_eq!(again.unwrap_err(), SubmissionError::DuplicateSubmission);
    assert_eq!(stored_count(&db, &email).await?, 1);
    Ok(())
}

/// Concurrent submissions with the same contact store exactly one row.
#[tokio::test]
#[ignore]
async fn concurrent_duplicates_store_one_row() -> anyhow::Result<()> {
    let db = Database::new(&test_config()?).await?;
    db.ensure_schema().await?;
    let storage = Arc::new(FormResponseStorage::new(db.pool.clone()));

    let (email, phone) = unique_contact("race");
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let storage = Arc::clone(&storage);
            let body = payload(&email, &phone);
            tokio::spawn(async move { submit(storage.as_ref(), &body).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => successes += 1,
            Err(SubmissionError::DuplicateSubmission) => {}
            Err(other) => anyhow::bail!("unexpected error: {}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(stored_count(&db, &email).await?, 1);
    Ok(())
}
