//! # OpsBoard App
//!
//! Application layer - command handlers and the runtime entry point.
//!
//! This crate contains:
//! - Command handlers (view layer → backend bridge)
//! - Application context (dependency injection)
//! - Main entry point and setup
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Exposes the operations the dashboard views bind to

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
