//! Port interfaces for attendance data
//!
//! These traits define the boundaries between core business logic
//! and the hosted store adapters.

use async_trait::async_trait;
use chrono::NaiveDate;
use opsboard_domain::{PunchRecord, Result, RosterMember};

/// Trait for reading the user roster.
#[async_trait]
pub trait RosterRepository: Send + Sync {
    /// Fetch the full roster snapshot, including members without punches.
    async fn fetch_roster(&self) -> Result<Vec<RosterMember>>;
}

/// Trait for reading attendance punches.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Fetch punches with `start <= date <= end`, in store order
    /// (assumed chronological per user and day).
    async fn fetch_punches(&self, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<PunchRecord>>;
}
