//! Prometheus metrics.
//!
//! HTTP traffic is recorded by the logging middleware; the business counters
//! are bumped by the services next to their domain events. Calls made before
//! [`install_recorder`] are discarded by the `metrics` facade.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use uuid::Uuid;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_RESPONSE_DURATION: &str = "http_response_duration_seconds";
pub const PVZ_CREATED_TOTAL: &str = "pvz_created_total";
pub const RECEPTIONS_CREATED_TOTAL: &str = "receptions_created_total";
pub const PRODUCTS_ADDED_TOTAL: &str = "products_added_total";

/// Prometheus client default buckets, in seconds.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Installs the process-wide recorder on first use and returns its handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let mut slot = HANDLE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(HTTP_RESPONSE_DURATION.to_string()),
            DURATION_BUCKETS,
        )?
        .install_recorder()?;
    *slot = Some(handle.clone());
    Ok(handle)
}

/// Periodically drains histogram buffers so `render` stays cheap.
pub fn spawn_upkeep(handle: PrometheusHandle, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            handle.run_upkeep();
        }
    })
}

pub fn record_http_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    let path = route_label(path);
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        HTTP_RESPONSE_DURATION,
        "method" => method.to_string(),
        "path" => path
    )
    .record(elapsed.as_secs_f64());
}

pub fn pickup_point_created() {
    counter!(PVZ_CREATED_TOTAL).increment(1);
}

pub fn reception_created() {
    counter!(RECEPTIONS_CREATED_TOTAL).increment(1);
}

pub fn product_added() {
    counter!(PRODUCTS_ADDED_TOTAL).increment(1);
}

/// Replaces UUID path segments with `{id}` to keep label cardinality bounded.
pub fn route_label(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if Uuid::try_parse(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
