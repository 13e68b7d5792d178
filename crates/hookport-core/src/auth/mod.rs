//! API credential authentication port.

pub mod authenticator;
