//! Clients for services Hookport dispatches to over the network.

pub mod registrar;
