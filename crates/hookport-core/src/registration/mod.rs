//! Trigger registration: the registrar port and the intake pipeline that
//! gates requests before they reach it.

pub mod intake;
pub mod registrar;
