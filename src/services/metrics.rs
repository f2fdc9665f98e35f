//! Metrics collection and Prometheus integration service.

use prometheus::{Counter, CounterVec, Gauge, Opts, Registry, TextEncoder};
use std::time::Instant;

/// Application metrics collector for Prometheus integration
#[derive(Clone)]
pub struct AppMetrics {
    pub registry: Registry,
    pub csp_headers_total: CounterVec,
    pub csp_nonced_responses_total: Counter,
    pub app_uptime_seconds: Gauge,
    pub app_info: CounterVec,
    pub start_time: Instant,
}

impl AppMetrics {
    /// Create a new metrics collector with default Prometheus metrics
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // CSP headers emitted, labelled by enforcement mode
        let csp_headers_total = CounterVec::new(
            Opts::new(
                "csp_headers_total",
                "Content-Security-Policy headers emitted",
            ),
            &["mode"],
        )?;

        // Responses whose policy carried a per-request nonce
        let csp_nonced_responses_total = Counter::new(
            "csp_nonced_responses_total",
            "Responses emitted with a per-request CSP nonce",
        )?;

        // Application uptime gauge
        let app_uptime_seconds = Gauge::new("app_uptime_seconds", "Application uptime in seconds")?;

        // Application info counter
        let app_info = CounterVec::new(
            Opts::new("app_info", "Application information"),
            &["version", "commit", "build_time"],
        )?;

        // Register all metrics
        registry.register(Box::new(csp_headers_total.clone()))?;
        registry.register(Box::new(csp_nonced_responses_total.clone()))?;
        registry.register(Box::new(app_uptime_seconds.clone()))?;
        registry.register(Box::new(app_info.clone()))?;

        let start_time = Instant::now();

        // Set application info
        app_info
            .with_label_values(&[
                env!("CARGO_PKG_VERSION"),
                option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
                option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
            ])
            .inc();

        Ok(Self {
            registry,
            csp_headers_total,
            csp_nonced_responses_total,
            app_uptime_seconds,
            app_info,
            start_time,
        })
    }

    /// Record one emitted CSP header
    pub fn record_policy_emitted(&self, report_only: bool) {
        let mode = if report_only { "report-only" } else { "enforce" };
        self.csp_headers_total.with_label_values(&[mode]).inc();
    }

    /// Record a response whose policy carried a nonce
    pub fn record_nonced_response(&self) {
        self.csp_nonced_responses_total.inc();
    }

    /// Update the application uptime gauge
    pub fn update_uptime(&self) {
        let uptime = self.start_time.elapsed().as_secs_f64();
        self.app_uptime_seconds.set(uptime);
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families)
    }
}
