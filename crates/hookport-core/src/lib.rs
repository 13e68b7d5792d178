//! Request-intake pipeline and port trait definitions for Hookport.
//!
//! This crate defines the "ports" (authenticator, registrar and membership
//! repository traits) that the infrastructure layer implements, and the
//! registration intake that drives them. It depends only on `hookport-types`
//! -- never on `hookport-infra` or any database/IO crate.

pub mod auth;
pub mod membership;
pub mod registration;
