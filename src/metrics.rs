/// Metrics Module - Prometheus Instrumentation
///
/// - Upstream call counters and latency histograms, labelled by service
/// - GeoIP cache outcomes and size
/// - Text exposition for `GET /metrics`

use lazy_static::lazy_static;
use once_cell::sync::OnceCell;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::time::Instant;

/// Standard latency buckets for histograms (seconds)
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Outbound calls by service (chronik, rpc, rank, geoip) and outcome (ok, error)
    pub static ref UPSTREAM_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("explorer_upstream_requests_total", "Upstream requests by service and outcome"),
        &["service", "outcome"]
    ).unwrap();

    pub static ref UPSTREAM_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("explorer_upstream_request_duration_seconds", "Upstream request latency")
            .buckets(LATENCY_BUCKETS.to_vec()),
        &["service"]
    ).unwrap();

    /// Labels: result (hit, miss, skipped, failed)
    pub static ref GEOIP_CACHE: IntCounterVec = IntCounterVec::new(
        Opts::new("explorer_geoip_cache_total", "GeoIP cache lookups by result"),
        &["result"]
    ).unwrap();

    pub static ref GEOIP_CACHE_ENTRIES: IntGauge = IntGauge::new(
        "explorer_geoip_cache_entries",
        "Entries currently held by the GeoIP cache"
    ).unwrap();
}

static INIT: OnceCell<()> = OnceCell::new();

/// Register every metric with the global registry. Safe to call repeatedly.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    INIT.get_or_try_init(|| {
        REGISTRY.register(Box::new(UPSTREAM_REQUESTS.clone()))?;
        REGISTRY.register(Box::new(UPSTREAM_DURATION.clone()))?;
        REGISTRY.register(Box::new(GEOIP_CACHE.clone()))?;
        REGISTRY.register(Box::new(GEOIP_CACHE_ENTRIES.clone()))?;
        Ok(())
    })
    .map(|_| ())
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Timer for measuring durations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Record the outcome and latency of one upstream call
pub fn observe_upstream(service: &str, ok: bool, timer: &Timer) {
    let outcome = if ok { "ok" } else { "error" };
    UPSTREAM_REQUESTS
        .with_label_values(&[service, outcome])
        .inc();
    UPSTREAM_DURATION
        .with_label_values(&[service])
        .observe(timer.elapsed_secs());
}

pub fn increment_geoip_cache(result: &str) {
    GEOIP_CACHE.with_label_values(&[result]).inc();
}

pub fn set_geoip_cache_entries(count: usize) {
    GEOIP_CACHE_ENTRIES.set(count as i64);
}
