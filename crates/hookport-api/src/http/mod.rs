//! HTTP/REST API layer for Hookport.
//!
//! Axum-based API at `/api/v1/` exposing the trigger registration intake.
//! Every failure is reported as `{ "error": <message> }`.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
