/*!
 * # Metrics Module
 *
 * This module provides a metrics collection system for the SiteStock API.
 * It exposes metrics for monitoring the health, performance, and usage of the API.
 *
 * ## Metrics Formats
 *
 * Metrics are exposed in the following formats:
 * - Prometheus text format at `/metrics`
 * - JSON format at `/metrics/json`
 */

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Duration;
use tracing::{debug, info};

// Simple in-memory metrics implementation
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
    #[error("Invalid metric name: {0}")]
    InvalidName(String),
    #[error("Metric not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct Gauge {
    value: Arc<AtomicU64>,
}

impl Gauge {
    pub fn new() -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn set(&self, value: f64) {
        self.value.store(value as u64, Ordering::Relaxed);
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        self.value.load(Ordering::Relaxed) as f64
    }
}

#[derive(Debug, Clone)]
pub struct Histogram {
    sum: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            sum: Arc::new(AtomicU64::new(0)),
            count: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn observe(&self, value: f64) {
        self.sum.fetch_add(value as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum(&self) -> f64 {
        self.sum.load(Ordering::Relaxed) as f64
    }
}

#[derive(Debug)]
pub struct MetricsRegistry {
    counters: Arc<DashMap<String, Counter>>,
    gauges: Arc<DashMap<String, Gauge>>,
    histograms: Arc<DashMap<String, Histogram>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(DashMap::new()),
            gauges: Arc::new(DashMap::new()),
            histograms: Arc::new(DashMap::new()),
        }
    }

    pub fn get_or_create_counter(&self, name: &str) -> Counter {
        self.counters
            .entry(name.to_string())
            .or_insert_with(Counter::new)
            .clone()
    }

    pub fn get_or_create_gauge(&self, name: &str) -> Gauge {
        self.gauges
            .entry(name.to_string())
            .or_insert_with(Gauge::new)
            .clone()
    }

    pub fn get_or_create_histogram(&self, name: &str) -> Histogram {
        self.histograms
            .entry(name.to_string())
            .or_insert_with(Histogram::new)
            .clone()
    }

    pub async fn export_metrics(&self) -> Result<String, MetricsError> {
        let mut output = String::new();

        // Export counters
        for entry in self.counters.iter() {
            let (name, counter) = entry.pair();
            output.push_str(&format!("# TYPE {} counter\n", name));
            output.push_str(&format!("{} {}\n", name, counter.get()));
        }

        // Export gauges
        for entry in self.gauges.iter() {
            let (name, gauge) = entry.pair();
            output.push_str(&format!("# TYPE {} gauge\n", name));
            output.push_str(&format!("{} {}\n", name, gauge.get()));
        }

        // Export histograms
        for entry in self.histograms.iter() {
            let (name, histogram) = entry.pair();
            output.push_str(&format!("# TYPE {} histogram\n", name));
            output.push_str(&format!("{}_count {}\n", name, histogram.get_count()));
            output.push_str(&format!("{}_sum {}\n", name, histogram.get_sum()));
        }

        Ok(output)
    }

    pub async fn export_metrics_json(&self) -> Result<serde_json::Value, MetricsError> {
        let mut counters = serde_json::Map::new();
        for entry in self.counters.iter() {
            let (name, counter) = entry.pair();
            counters.insert(name.to_string(), json!(counter.get()));
        }

        let mut gauges = serde_json::Map::new();
        for entry in self.gauges.iter() {
            let (name, gauge) = entry.pair();
            gauges.insert(name.to_string(), json!(gauge.get()));
        }

        let mut histograms = serde_json::Map::new();
        for entry in self.histograms.iter() {
            let (name, histogram) = entry.pair();
            histograms.insert(
                name.to_string(),
                json!({
                    "count": histogram.get_count(),
                    "sum": histogram.get_sum(),
                }),
            );
        }

        Ok(json!({
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        }))
    }
}

// Global metrics registry
lazy_static::lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}

// Metrics collection functions
pub fn increment_counter(name: &str) {
    METRICS.get_or_create_counter(name).inc();
}

pub fn increment_counter_by(name: &str, value: u64) {
    METRICS.get_or_create_counter(name).inc_by(value);
}

pub fn set_gauge(name: &str, value: f64) {
    METRICS.get_or_create_gauge(name).set(value);
}

pub fn observe_histogram(name: &str, value: f64) {
    METRICS.get_or_create_histogram(name).observe(value);
}

// Application-specific metrics
pub struct AppMetrics {
    pub requests_total: Counter,
    pub requests_duration: Histogram,
    pub database_connections: Gauge,
    pub errors_total: Counter,
}

impl AppMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: METRICS.get_or_create_counter("http_requests_total"),
            requests_duration: METRICS.get_or_create_histogram("http_request_duration_seconds"),
            database_connections: METRICS.get_or_create_gauge("database_connections_active"),
            errors_total: METRICS.get_or_create_counter("errors_total"),
        }
    }

    pub fn record_request(&self, duration: Duration) {
        self.requests_total.inc();
        self.requests_duration.observe(duration.as_secs_f64());
    }

    pub fn record_error(&self) {
        self.errors_total.inc();
    }

    pub fn set_database_connections(&self, count: u64) {
        self.database_connections.set(count as f64);
    }
}

// Business metrics
pub struct BusinessMetrics {
    pub products_created: Counter,
    pub products_deleted: Counter,
    pub sites_created: Counter,
    pub sites_deleted: Counter,
    pub usage_batches_recorded: Counter,
    pub usage_events_written: Counter,
    pub low_stock_alerts: Counter,
    pub stock_update_failures: Counter,
}

impl BusinessMetrics {
    pub fn new() -> Self {
        Self {
            products_created: METRICS.get_or_create_counter("products_created_total"),
            products_deleted: METRICS.get_or_create_counter("products_deleted_total"),
            sites_created: METRICS.get_or_create_counter("sites_created_total"),
            sites_deleted: METRICS.get_or_create_counter("sites_deleted_total"),
            usage_batches_recorded: METRICS.get_or_create_counter("usage_batches_recorded_total"),
            usage_events_written: METRICS.get_or_create_counter("usage_events_written_total"),
            low_stock_alerts: METRICS.get_or_create_counter("low_stock_alerts_total"),
            stock_update_failures: METRICS.get_or_create_counter("stock_update_failures_total"),
        }
    }

    pub fn record_product_created(&self) {
        self.products_created.inc();
    }

    pub fn record_product_deleted(&self) {
        self.products_deleted.inc();
    }

    pub fn record_site_created(&self) {
        self.sites_created.inc();
    }

    pub fn record_site_deleted(&self) {
        self.sites_deleted.inc();
    }

    pub fn record_usage_batch(&self, events_written: u64) {
        self.usage_batches_recorded.inc();
        self.usage_events_written.inc_by(events_written);
    }

    pub fn record_low_stock_alert(&self) {
        self.low_stock_alerts.inc();
    }

    pub fn record_stock_update_failure(&self) {
        self.stock_update_failures.inc();
    }
}

// Global instances
lazy_static::lazy_static! {
    pub static ref APP_METRICS: AppMetrics = AppMetrics::new();
    pub static ref BUSINESS_METRICS: BusinessMetrics = BusinessMetrics::new();
}

// Health check for metrics
pub async fn metrics_health_check() -> Result<(), MetricsError> {
    // Simple health check - just try to export metrics
    let _metrics = METRICS.export_metrics().await?;
    Ok(())
}

// Configuration for metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub export_endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            export_endpoint: "/metrics".to_string(),
        }
    }
}

// Metrics exporter trait
#[async_trait]
pub trait MetricsExporter: Send + Sync {
    async fn export(&self, metrics: &str) -> Result<(), MetricsError>;
}

// Console exporter for development
pub struct ConsoleExporter;

#[async_trait]
impl MetricsExporter for ConsoleExporter {
    async fn export(&self, metrics: &str) -> Result<(), MetricsError> {
        debug!("Metrics:\n{}", metrics);
        Ok(())
    }
}

// HTTP endpoint handler for metrics
pub async fn metrics_handler() -> Result<String, MetricsError> {
    METRICS.export_metrics().await
}

pub async fn metrics_json_handler() -> Result<serde_json::Value, MetricsError> {
    METRICS.export_metrics_json().await
}

// Initialize metrics system
pub async fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        info!("Metrics collection disabled");
        return Ok(());
    }

    info!("Initializing metrics system");

    // Set up initial metrics and verify the export path once at startup
    APP_METRICS.set_database_connections(0);
    let exporter = ConsoleExporter;
    let snapshot = METRICS.export_metrics().await?;
    exporter.export(&snapshot).await?;

    info!("Metrics system initialized successfully");
    Ok(())
}
