//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Attendance defaults
pub const DEFAULT_LATE_THRESHOLD: &str = "10:10";
pub const MISSING_AVERAGE_PLACEHOLDER: &str = "-";

// Calendar display colors (hex, resolved client-side)
pub const COLOR_MEETING: &str = "#3b82f6";
pub const COLOR_SITE_VISIT: &str = "#f59e0b";
pub const COLOR_DEADLINE: &str = "#ef4444";
pub const COLOR_PERSONAL: &str = "#8b5cf6";
pub const COLOR_OTHER: &str = "#64748b";
// Done events always render in this color, regardless of category
pub const COLOR_COMPLETED: &str = "#9ca3af";

// Default time zone for local-day bucketing
pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";

// Change-feed table names pushed by the hosted store
pub const TABLE_EVENTS: &str = "events";
pub const TABLE_ATTENDANCE: &str = "attendance";
pub const TABLE_TASKS: &str = "tasks";
pub const TABLE_NOTIFICATIONS: &str = "notifications";
