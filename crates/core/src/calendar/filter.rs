//! View-side event filtering

use opsboard_domain::{CalendarEvent, EventCategory};
use serde::{Deserialize, Serialize};

/// Filter applied to the reconciler's local view.
///
/// Criteria combine with AND; an unset criterion matches everything. An
/// empty `client_name` string is treated as unset, matching how the view
/// layer clears a text input rather than removing the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl EventFilter {
    /// True when no criterion constrains the view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.client_name.as_deref().map_or(true, str::is_empty)
            && self.assignee.is_none()
            && self.search.as_deref().map_or(true, str::is_empty)
    }

    /// Whether `event` passes every set criterion.
    #[must_use]
    pub fn matches(&self, event: &CalendarEvent) -> bool {
        if let Some(category) = &self.category {
            if event.category != *category {
                return false;
            }
        }
        if let Some(client) = self.client_name.as_deref().filter(|c| !c.is_empty()) {
            if event.client_name.as_deref() != Some(client) {
                return false;
            }
        }
        if let Some(assignee) = &self.assignee {
            if !event.is_assigned_to(assignee) {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !event.title.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}
