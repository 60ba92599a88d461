//! Roster types
//!
//! Read-only snapshot of the user roster. The aggregation seeds its per-day
//! map from this list so that members with zero punches still report as
//! fully absent.

use serde::{Deserialize, Serialize};

/// Access role of a roster member.
///
/// Admins own calendar mutations (create/update/delete/move/resize); members
/// may only toggle completion on events assigned to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Member,
}

/// One entry of the user roster as the hosted store returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    pub id: String,
    pub name: String,
    pub department: String,
    pub position: String,
    pub username: String,
    pub role: Role,
    /// Active flag; hidden members are excluded from dashboard views.
    pub show: bool,
}

impl RosterMember {
    /// True when this member may mutate event timing and lifecycle.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
