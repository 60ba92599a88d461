//! Store adapters
//!
//! [`MemoryStore`] is the in-process adapter for the hosted store: it keeps
//! loosely-typed JSON rows exactly as the remote service would return them
//! and normalizes at the fetch boundary. [`ChangeHub`] stands in for the
//! realtime change feed.

pub mod changes;
pub mod memory;

pub use changes::ChangeHub;
pub use memory::MemoryStore;
