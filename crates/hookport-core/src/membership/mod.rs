//! Organization team membership: repository port and service.

pub mod repository;
pub mod service;
