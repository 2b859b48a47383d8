use crate::metrics::collector::Metrics;
use crate::Result;
use prometheus::{Encoder, TextEncoder};

/// Renders a `Metrics` registry in the Prometheus text exposition format.
pub struct PrometheusExporter {
    metrics: Metrics,
}

impl PrometheusExporter {
    pub fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }

    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    pub fn format_current_metrics(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let families = self.metrics.registry().gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| crate::IgniteError::MetricsError(e.to_string()))
    }
}
