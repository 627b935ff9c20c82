//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    CATALOG_CONFLICTS_TOTAL, CATALOG_CREATED_TOTAL, CATALOG_UPDATED_TOTAL, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_LATENCY,
    MESSAGES_FAILED_TOTAL, MESSAGES_RENDERED_TOTAL, TAGS_FAILED_TOTAL, TAGS_INSERTED_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording catalog write metrics
pub struct CatalogMetrics;

impl CatalogMetrics {
    /// Record a created application, event or notification
    pub fn record_created(entity: &str) {
        CATALOG_CREATED_TOTAL.with_label_values(&[entity]).inc();
    }

    /// Record an updated application, event or notification
    pub fn record_updated(entity: &str) {
        CATALOG_UPDATED_TOTAL.with_label_values(&[entity]).inc();
    }

    /// Record a write rejected by a name conflict
    pub fn record_conflict(entity: &str) {
        CATALOG_CONFLICTS_TOTAL.with_label_values(&[entity]).inc();
    }
}

/// Helper struct for recording tag catalog metrics
pub struct TagMetrics;

impl TagMetrics {
    pub fn record_inserted() {
        TAGS_INSERTED_TOTAL.inc();
    }

    pub fn record_failure() {
        TAGS_FAILED_TOTAL.inc();
    }
}

/// Helper struct for recording message rendering metrics
pub struct MessageMetrics;

impl MessageMetrics {
    /// Record messages rendered in one call
    pub fn record_rendered(count: u64) {
        MESSAGES_RENDERED_TOTAL.inc_by(count);
    }

    /// Record messages that could not be stored
    pub fn record_failed(count: u64) {
        MESSAGES_FAILED_TOTAL.inc_by(count);
    }
}

/// Helper struct for HTTP request metrics
pub struct HttpMetrics;

impl HttpMetrics {
    /// Record a completed HTTP request
    pub fn record_request(method: &str, path: &str, status: u16, latency_secs: f64) {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&[method, path, &status.to_string()])
            .inc();
        HTTP_REQUEST_LATENCY
            .with_label_values(&[method, path])
            .observe(latency_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_recorded_metrics() {
        CatalogMetrics::record_created("application");
        TagMetrics::record_inserted();
        HttpMetrics::record_request("GET", "/health", 200, 0.001);

        let output = encode_metrics().unwrap();
        assert!(output.contains("notif_catalog_created_total"));
        assert!(output.contains("notif_tags_inserted_total"));
        assert!(output.contains("notif_http_requests_total"));
    }

    #[test]
    fn test_conflict_counter_per_entity() {
        CatalogMetrics::record_conflict("event");
        let value = CATALOG_CONFLICTS_TOTAL.with_label_values(&["event"]).get();
        assert!(value >= 1);
    }
}
