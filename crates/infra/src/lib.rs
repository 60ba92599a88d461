//! # OpsBoard Infrastructure
//!
//! Adapters for the port traits defined in `opsboard-core`:
//! - An in-process store adapter speaking the hosted store's loose JSON row
//!   format, with a change hub standing in for the realtime feed
//! - The configuration loader (environment variables, then config files)
//!
//! ## Architecture
//! - Implements core port traits (`EventStore`, `ChangeFeed`, repositories)
//! - Normalizes loosely-typed rows into domain types at the fetch boundary
//! - No business logic; that lives in `opsboard-core`

pub mod config;
pub mod store;

pub use store::{ChangeHub, MemoryStore};
