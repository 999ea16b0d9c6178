use bytes::Bytes;
use prometheus::{core::Collector, Encoder, TextEncoder};

pub use prometheus::{
    self,
    core::{AtomicU64 as U64, GenericCounter as Counter, GenericCounterVec as CounterVec},
    Error as PrometheusError, Opts, Registry,
};

pub fn register<T: Clone + Collector + 'static>(metric: T, registry: &Registry) -> Result<T, PrometheusError> {
    registry.register(Box::new(metric.clone()))?;
    Ok(metric)
}

/// A gathered registry in the Prometheus text exposition format.
#[derive(Debug, Clone)]
pub struct Exposition {
    pub content_type: String,
    pub body: Bytes,
}

/// Gathers every metric family of `registry` and encodes them as text.
pub fn gather(registry: &Registry) -> Result<Exposition, PrometheusError> {
    let metric_families = registry.gather();
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(Exposition { content_type: encoder.format_type().to_string(), body: Bytes::from(buffer) })
}
