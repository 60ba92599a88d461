//! Health check infrastructure for AppContext components
//!
//! Provides `HealthStatus` and `ComponentHealth` for reporting whether the
//! store, config, and refresh worker are usable.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Overall health status of the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Overall health indicator
    pub is_healthy: bool,

    /// Health score from 0.0 (completely unhealthy) to 1.0 (fully healthy)
    ///
    /// Calculated as: (healthy_components / total_components)
    pub score: f64,

    /// Optional message describing overall health state
    pub message: Option<String>,

    /// Individual component health checks
    pub components: Vec<ComponentHealth>,

    /// Unix timestamp when health check was performed
    pub timestamp: i64,
}

fn now_unix() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or_default()
}

impl HealthStatus {
    /// Create a new health status with default values
    ///
    /// Initial state: healthy with score 1.0, no components
    pub fn new() -> Self {
        Self {
            is_healthy: true,
            score: 1.0,
            message: None,
            components: Vec::new(),
            timestamp: now_unix(),
        }
    }

    /// Add a component health check, returning self for chaining.
    pub fn add_component(mut self, component: ComponentHealth) -> Self {
        self.components.push(component);
        self
    }

    /// Recompute `score` and `is_healthy` from the recorded components.
    ///
    /// `is_healthy` requires at least 80% of components healthy. Should be
    /// called after all components have been added.
    pub fn calculate_score(&mut self) {
        if self.components.is_empty() {
            return;
        }

        let healthy_count = self.components.iter().filter(|c| c.is_healthy).count();

        self.score = healthy_count as f64 / self.components.len() as f64;
        self.is_healthy = self.score >= 0.8;
    }

    /// Create an unhealthy status with a message
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            is_healthy: false,
            score: 0.0,
            message: Some(message.into()),
            components: Vec::new(),
            timestamp: now_unix(),
        }
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Health status of an individual component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component identifier (e.g., "store", "config")
    pub name: String,

    /// Whether the component is healthy
    pub is_healthy: bool,

    /// Optional message describing health state or error
    pub message: Option<String>,
}

impl ComponentHealth {
    /// Create a healthy component status
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    /// Create an unhealthy component status with a message
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }
}
