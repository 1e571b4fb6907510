//! Storage port for form responses.
//!
//! A submission runs its duplicate check and insert inside one
//! [`SubmissionTransaction`]. Beginning the transaction acquires the
//! underlying connection; committing, rolling back, or dropping it releases
//! the connection again.

use async_trait::async_trait;
use std::fmt;

use crate::form_models::FormResponseRecord;

/// Failures reported by a [`SubmissionStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store rejected a row because its email or phone is already taken.
    UniqueViolation,
    /// Any other datastore failure (connection, query, commit).
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UniqueViolation => write!(f, "Unique constraint violation"),
            StoreError::Backend(msg) => write!(f, "Datastore error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Acquires a connection and opens a transaction on it.
    async fn begin(&self) -> Result<Box<dyn SubmissionTransaction>, StoreError>;
}

#[async_trait]
pub trait SubmissionTransaction: Send {
    /// Id of any record already using `email` or `phone`.
    async fn find_existing(&mut self, email: &str, phone: &str)
        -> Result<Option<i64>, StoreError>;

    /// Inserts `record` and returns its generated id.
    async fn insert(&mut self, record: &FormResponseRecord) -> Result<i64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
