//! Prometheus metrics collected by the relay.

use crate::prometheus_handler::{register, CounterVec, Opts, PrometheusError, Registry, U64};

/// Counters for served requests, received chain events and webhook deliveries.
#[derive(Debug, Clone)]
pub struct RelayMetrics {
    /// Number of HTTP requests answered, by route and status.
    http_requests: CounterVec<U64>,
    /// Number of factory events received from the chain, by kind.
    events_received: CounterVec<U64>,
    /// Number of webhook delivery attempts, by outcome.
    webhook_deliveries: CounterVec<U64>,
}

impl RelayMetrics {
    /// Creates the metrics and registers them in `registry`.
    pub fn new(registry: &Registry) -> Result<Self, PrometheusError> {
        Ok(Self {
            http_requests: register(
                CounterVec::new(
                    Opts::new("relay_http_requests_total", "Number of HTTP requests answered by the relay"),
                    &["route", "status"],
                )?,
                registry,
            )?,
            events_received: register(
                CounterVec::new(
                    Opts::new("relay_events_received_total", "Number of token factory events received"),
                    &["kind"],
                )?,
                registry,
            )?,
            webhook_deliveries: register(
                CounterVec::new(
                    Opts::new("relay_webhook_deliveries_total", "Number of webhook delivery attempts"),
                    &["outcome"],
                )?,
                registry,
            )?,
        })
    }

    pub fn on_request(&self, route: &str, status: u16) {
        self.http_requests.with_label_values(&[route, &status.to_string()]).inc();
    }

    pub fn on_event(&self, kind: &str) {
        self.events_received.with_label_values(&[kind]).inc();
    }

    pub fn on_delivery(&self, delivered: bool) {
        let outcome = if delivered { "success" } else { "failure" };
        self.webhook_deliveries.with_label_values(&[outcome]).inc();
    }
}
