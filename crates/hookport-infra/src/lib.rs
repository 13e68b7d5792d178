//! Infrastructure layer for Hookport.
//!
//! Contains implementations of the ports defined in `hookport-core`:
//! SQLite storage (API keys, registrations, membership), the remote HTTP
//! registrar, credential hashing and token generation, and config loading.

pub mod config;
pub mod crypto;
pub mod remote;
pub mod sqlite;
