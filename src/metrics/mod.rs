// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for the order core
// ============================================================================
//
// Provides:
// - Placement attempts by outcome (placed, invalid, internal)
// - Update attempts by outcome (applied, window_expired, conflict, ...)
// - Searches and returned rows
// - Operation latency per operation
//
// Scraped via /metrics on the metrics server.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub order_placements: IntCounterVec,
    pub order_updates: IntCounterVec,
    pub order_searches: IntCounter,
    pub search_results_returned: IntCounter,
    pub operation_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let order_placements = IntCounterVec::new(
            Opts::new("order_placements_total", "Order placement attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(order_placements.clone()))?;

        let order_updates = IntCounterVec::new(
            Opts::new("order_updates_total", "Order update attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(order_updates.clone()))?;

        let order_searches = IntCounter::new("order_searches_total", "Total order searches")?;
        registry.register(Box::new(order_searches.clone()))?;

        let search_results_returned = IntCounter::new(
            "order_search_results_returned_total",
            "Total order summaries returned by searches",
        )?;
        registry.register(Box::new(search_results_returned.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new("order_operation_duration_seconds", "Order operation duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            registry,
            order_placements,
            order_updates,
            order_searches,
            search_results_returned,
            operation_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_placement(&self, outcome: &str, duration_secs: f64) {
        self.order_placements.with_label_values(&[outcome]).inc();
        self.observe("place_order", duration_secs);
    }

    pub fn record_update(&self, outcome: &str, duration_secs: f64) {
        self.order_updates.with_label_values(&[outcome]).inc();
        self.observe("update_order", duration_secs);
    }

    pub fn record_search(&self, returned: usize, duration_secs: f64) {
        self.order_searches.inc();
        self.search_results_returned.inc_by(returned as u64);
        self.observe("search_orders", duration_secs);
    }

    fn observe(&self, operation: &str, duration_secs: f64) {
        self.operation_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(!metrics.registry.gather().is_empty());
    }

    #[test]
    fn test_record_update_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record_update("applied", 0.01);
        metrics.record_update("conflict", 0.01);
        metrics.record_update("conflict", 0.02);

        let gathered = metrics.registry.gather();
        let updates = gathered
            .iter()
            .find(|m| m.name() == "order_updates_total")
            .unwrap();
        assert_eq!(updates.metric.len(), 2); // Two different outcome labels
    }

    #[test]
    fn test_record_search() {
        let metrics = Metrics::new().unwrap();
        metrics.record_search(7, 0.003);
        metrics.record_search(3, 0.004);

        let gathered = metrics.registry.gather();
        let returned = gathered
            .iter()
            .find(|m| m.name() == "order_search_results_returned_total")
            .unwrap();
        assert_eq!(returned.metric[0].counter.value, Some(10.0));
    }
}
