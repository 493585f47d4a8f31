//! HTTP client for the avalanche backend.
//!
//! Two unauthenticated endpoints: the AWS map-bootstrap credentials and
//! the accident list. Failures are classified into [`crate::error::AppError`]
//! at the call sites here, per stage.

pub mod client;

pub use client::ApiClient;
