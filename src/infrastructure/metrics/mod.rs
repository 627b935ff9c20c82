//! Prometheus metrics for the template service.
//!
//! This module provides metrics for monitoring the catalog:
//! - Catalog write metrics (creates, updates, conflicts by entity)
//! - Tag catalog metrics (labels inserted, reconciliation failures)
//! - Message rendering metrics (rendered, persisted, failed)
//! - HTTP metrics (requests, latency)

mod helpers;

pub use helpers::{encode_metrics, CatalogMetrics, HttpMetrics, MessageMetrics, TagMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "notif";

lazy_static! {
    // ============================================================================
    // Catalog Metrics
    // ============================================================================

    /// Entities created, by entity type
    pub static ref CATALOG_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_catalog_created_total", METRIC_PREFIX),
        "Total catalog entities created",
        &["entity"]
    ).unwrap();

    /// Entities updated, by entity type
    pub static ref CATALOG_UPDATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_catalog_updated_total", METRIC_PREFIX),
        "Total catalog entities updated",
        &["entity"]
    ).unwrap();

    /// Writes rejected by a uniqueness rule, by entity type
    pub static ref CATALOG_CONFLICTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_catalog_conflicts_total", METRIC_PREFIX),
        "Total catalog writes rejected by a name conflict",
        &["entity"]
    ).unwrap();

    // ============================================================================
    // Tag Metrics
    // ============================================================================

    /// Labels added to the tag catalog
    pub static ref TAGS_INSERTED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_tags_inserted_total", METRIC_PREFIX),
        "Total labels added to the tag catalog"
    ).unwrap();

    /// Labels that could not be reconciled
    pub static ref TAGS_FAILED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_tags_failed_total", METRIC_PREFIX),
        "Total labels skipped during tag reconciliation"
    ).unwrap();

    // ============================================================================
    // Message Metrics
    // ============================================================================

    /// Messages rendered for a recipient
    pub static ref MESSAGES_RENDERED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_messages_rendered_total", METRIC_PREFIX),
        "Total messages rendered"
    ).unwrap();

    /// Rendered messages that failed to persist
    pub static ref MESSAGES_FAILED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_messages_failed_total", METRIC_PREFIX),
        "Total rendered messages that could not be stored"
    ).unwrap();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// HTTP requests by method, route and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_http_requests_total", METRIC_PREFIX),
        "Total HTTP requests",
        &["method", "path", "status"]
    ).unwrap();

    /// HTTP request latency
    pub static ref HTTP_REQUEST_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_http_request_latency_seconds", METRIC_PREFIX),
        "HTTP request latency in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    ).unwrap();
}
