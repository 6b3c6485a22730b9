use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};
use tracing::warn;

/// Metric name prefix for all playlist service metrics
const PREFIX: &str = "playlists";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Cache Metrics
    pub static ref CACHE_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_cache_requests_total"), "Playlist songs cache reads"),
        &["result"]
    ).expect("Failed to create cache_requests_total metric");

    pub static ref CACHE_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_cache_errors_total"), "Cache backend failures absorbed by the cache layer"),
        &["operation"]
    ).expect("Failed to create cache_errors_total metric");

    // Export Metrics
    pub static ref EXPORT_JOBS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_export_jobs_total"), "Export job dispatch attempts"),
        &["status"]
    ).expect("Failed to create export_jobs_total metric");
}

/// Registers all metrics with the registry. Calling it more than once is harmless.
pub fn init_metrics() {
    let collectors: [Box<dyn prometheus::core::Collector>; 3] = [
        Box::new(CACHE_REQUESTS_TOTAL.clone()),
        Box::new(CACHE_ERRORS_TOTAL.clone()),
        Box::new(EXPORT_JOBS_TOTAL.clone()),
    ];
    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => warn!("Failed to register metric: {}", e),
        }
    }
}

/// `result` is either "hit" or "miss".
pub fn record_cache_request(result: &str) {
    CACHE_REQUESTS_TOTAL.with_label_values(&[result]).inc();
}

pub fn record_cache_error(operation: &str) {
    CACHE_ERRORS_TOTAL.with_label_values(&[operation]).inc();
}

/// `status` is one of "accepted", "rejected" or "failed".
pub fn record_export_job(status: &str) {
    EXPORT_JOBS_TOTAL.with_label_values(&[status]).inc();
}

/// Renders every registered metric in the Prometheus text format.
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gathers_registered_metrics() {
        init_metrics();
        init_metrics();
        record_cache_request("hit");
        record_export_job("accepted");

        let text = gather();
        assert!(text.contains("playlists_cache_requests_total"));
        assert!(text.contains("playlists_export_jobs_total"));
    }
}
