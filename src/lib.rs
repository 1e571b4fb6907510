//! Desirability Form API Library
//!
//! Accepts desirability survey submissions over HTTP, validates the personal
//! information, rejects repeat email/phone submissions, flattens the answer
//! groups into text columns, and stores one row per submission in Postgres.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Submission pipeline, models, and errors.
//! - `config`: Configuration management.
//! - `db`: Database connection pool and schema DDL.
//! - `db_storage`: Postgres storage for form responses.
//! - `errors`: Error handling types.
//! - `form_models`: Request, response, and row types.
//! - `handlers`: HTTP request handlers.
//! - `mapping`: Truncation and answer flattening.
//! - `memory_store`: In-process store used by tests.
//! - `router`: Router and middleware assembly.
//! - `storage`: Storage port traits.
//! - `submission`: The submit pipeline.

pub mod api;
pub mod core;

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod form_models;
pub mod handlers;
pub mod mapping;
pub mod memory_store;
pub mod router;
pub mod storage;
pub mod submission;
