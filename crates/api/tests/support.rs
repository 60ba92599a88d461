//! Shared context setup for app-layer integration tests

use std::sync::Arc;

use opsboard_domain::Config;
use opsboard_lib::AppContext;
use serde_json::json;

/// Create a context with the default config (Asia/Seoul) and a seeded store.
pub fn setup_test_context() -> Arc<AppContext> {
    let ctx = AppContext::with_config(Config::default()).expect("context should initialize");
    let ctx = Arc::new(ctx);

    ctx.store.seed_roster(vec![
        json!({ "id": "1", "name": "Ava", "department": "Ops", "position": "Manager", "username": "ava", "role": "admin" }),
        json!({ "id": "2", "name": "Ben", "department": "Field", "position": "Technician", "username": "ben", "role": "member" }),
        json!({ "id": "3", "name": "Cleo", "department": "Field", "position": "Technician", "username": "cleo", "role": "member", "show": false }),
    ]);

    ctx.store.seed_punches(vec![
        json!({ "userId": "1", "date": "2024-05-01", "time": "09:58" }),
        json!({ "userId": "1", "date": "2024-05-01", "time": "18:03" }),
        json!({ "userId": "2", "date": "2024-05-01", "time": "10:31" }),
    ]);

    ctx.store.seed_events(vec![
        json!({
            "id": "e1",
            "title": "Standup",
            "startTime": "2024-05-01T00:30:00Z",
            "endTime": "2024-05-01T01:00:00Z",
            "category": "meeting",
            "assignedUserIds": ["2"],
        }),
        json!({
            "id": "e2",
            "title": "Site visit",
            "startTime": "2024-05-02T01:00:00Z",
            "endTime": "2024-05-02T03:00:00Z",
            "category": "site_visit",
            "clientName": "Acme",
            // Store quirk: single assignee as a bare number.
            "assignedUserIds": 2,
        }),
    ]);

    ctx
}
