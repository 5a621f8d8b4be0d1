//! Metrics collection for observability

use prometheus::{
    CounterVec, HistogramVec, Opts, Registry,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
};
use std::sync::Arc;
use once_cell::sync::Lazy;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Search call metrics
    pub search_requests: CounterVec,
    pub search_request_duration: HistogramVec,

    // Normalization metrics
    pub response_shapes: CounterVec,
    pub search_failures: CounterVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let search_requests = register_counter_vec_with_registry!(
            Opts::new("visearch_requests_total", "Total ViSearch calls"),
            &["endpoint", "status"],
            registry
        )?;

        let search_request_duration = register_histogram_vec_with_registry!(
            "visearch_request_duration_seconds",
            "ViSearch call duration in seconds, including normalization",
            &["endpoint"],
            registry
        )?;

        let response_shapes = register_counter_vec_with_registry!(
            Opts::new("visearch_response_shapes_total", "Normalized responses by item layout"),
            &["shape"],
            registry
        )?;

        let search_failures = register_counter_vec_with_registry!(
            Opts::new("visearch_failures_total", "Failed ViSearch calls by error kind"),
            &["kind"],
            registry
        )?;

        Ok(Self {
            registry,
            search_requests,
            search_request_duration,
            response_shapes,
            search_failures,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a successful call and the shape it produced
    pub fn record_success(&self, endpoint: &str, shape: &str) {
        self.search_requests.with_label_values(&[endpoint, "success"]).inc();
        self.response_shapes.with_label_values(&[shape]).inc();
    }

    /// Record a failed call
    pub fn record_failure(&self, endpoint: &str, kind: &str) {
        self.search_requests.with_label_values(&[endpoint, "error"]).inc();
        self.search_failures.with_label_values(&[kind]).inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let metrics = Metrics::new();
        assert!(metrics.is_ok());
    }

    #[test]
    fn test_record_and_export() {
        let metrics = Metrics::new().unwrap();
        metrics.record_success("search", "flat");
        metrics.record_failure("uploadsearch", "missing_image_source");

        let text = metrics.export_prometheus();
        assert!(text.contains("visearch_requests_total"));
        assert!(text.contains("missing_image_source"));
        assert!(text.contains("shape=\"flat\""));
    }
}
