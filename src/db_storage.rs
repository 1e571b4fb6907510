use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::form_models::FormResponseRecord;
use crate::storage::{StoreError, SubmissionStore, SubmissionTransaction};

/// Postgres-backed storage for form responses.
pub struct FormResponseStorage {
    pool: PgPool,
}

impl FormResponseStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for FormResponseStorage {
    async fn begin(&self) -> Result<Box<dyn SubmissionTransaction>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSubmissionTransaction { tx }))
    }
}

/// Open transaction holding one pooled connection.
///
/// Dropping it without commit rolls back and returns the connection to the pool.
pub struct PgSubmissionTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SubmissionTransaction for PgSubmissionTransaction {
    async fn find_existing(
        &mut self,
        email: &str,
        phone: &str,
    ) -> Result<Option<i64>, StoreError> {
        let existing = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM desirablity_form_responses
            WHERE email = $1 OR phone = $2
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(phone)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(existing)
    }

    async fn insert(&mut self, record: &FormResponseRecord) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO desirablity_form_responses (
                full_name, gender, city, email, phone, occupation,
                weekend_options, meeting_feeling, vibe_selections,
                last_new_thing, main_frustration, meeting_blocker,
                safe_fun_option, platform_likelihood
            ) VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9,
                $10, $11, $12,
                $13, $14
            )
            RETURNING id
            "#,
        )
        .bind(&record.full_name)
        .bind(&record.gender)
        .bind(&record.city)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.occupation)
        .bind(&record.weekend_options)
        .bind(&record.meeting_feeling)
        .bind(&record.vibe_selections)
        .bind(&record.last_new_thing)
        .bind(&record.main_frustration)
        .bind(&record.meeting_blocker)
        .bind(&record.safe_fun_option)
        .bind(&record.platform_likelihood)
        .fetch_one(&mut *self.tx)
        .await?;

        tracing::debug!("Inserted form response id={}", id);
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
