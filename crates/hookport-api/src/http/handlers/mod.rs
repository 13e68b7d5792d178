//! Route handlers.

pub mod registration;
