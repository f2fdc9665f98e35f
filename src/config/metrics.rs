//! Metrics configuration.

use std::env;

/// Configuration for application metrics collection
#[derive(Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route the Prometheus endpoint is served from.
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/api/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let enabled = env::var("METRICS_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        let endpoint =
            env::var("METRICS_ENDPOINT").unwrap_or_else(|_| "/api/metrics".to_string());

        Self { enabled, endpoint }
    }
}
