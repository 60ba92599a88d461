//! Command handlers the dashboard views bind to

pub mod attendance;
pub mod calendar;

pub use attendance::*;
pub use calendar::*;
