use std::sync::OnceLock;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder (once per process) and register all
/// application metrics. Returns a `PrometheusHandle` whose `render()` method
/// produces the text/plain Prometheus scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();

            if let Err(e) = metrics::set_global_recorder(recorder) {
                tracing::warn!(error = %e, "Metrics recorder already installed");
            }

            // Pre-register counters so they appear even before the first increment.
            counter!("trades_imported_total").absolute(0);
            counter!("journal_autosaves_total").absolute(0);
            counter!("canvases_imported_total").absolute(0);
            counter!("jarvis_requests_total").absolute(0);
            counter!("jarvis_failures_total").absolute(0);

            histogram!("jarvis_latency_seconds").record(0.0);

            handle
        })
        .clone()
}
