//! Shared application utilities

pub mod health;
pub mod logging;
