//! Cryptographic helpers for Hookport.
//!
//! - `hash`: SHA-256 digests of API keys (only digests are stored)
//! - `token`: random API keys, signing secrets and invite tokens

pub mod hash;
pub mod token;
