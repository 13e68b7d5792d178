//! Shared domain types for Hookport.
//!
//! This crate contains the domain types used across the Hookport service:
//! tenant environments, trigger registrations, organizations and their
//! members, and the associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, validator.

pub mod config;
pub mod environment;
pub mod error;
pub mod organization;
pub mod trigger;
