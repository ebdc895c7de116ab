//! Prometheus metrics for store operations.
//!
//! Every store operation brackets its storage interaction with a duration
//! timer labelled with the store name and the operation name. The histogram
//! lives in the global default registry; recording a timing can never fail
//! an operation.

use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, HistogramTimer, HistogramVec};

/// Store operation latency histogram, registered on first use.
static STORE_OPERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        prometheus::histogram_opts!(
            "flagdeck_store_operation_duration_seconds",
            "Store operation latency in seconds",
            // Query-sized buckets: 1ms to 2.5s
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
        ),
        &["store", "action"]
    )
    .expect("failed to register flagdeck_store_operation_duration_seconds")
});

/// Start timing a store operation.
///
/// The returned timer records the elapsed duration when dropped, so callers
/// bind it for the scope of the operation and let it fall out of scope.
pub fn store_operation_timer(store: &str, action: &str) -> HistogramTimer {
    STORE_OPERATION_DURATION
        .with_label_values(&[store, action])
        .start_timer()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_records_on_drop() {
        let timer = store_operation_timer("api-tokens", "count");
        drop(timer);

        let families = prometheus::gather();
        let family = families
            .iter()
            .find(|f| f.get_name() == "flagdeck_store_operation_duration_seconds")
            .expect("histogram not registered");

        let sample_count: u64 = family
            .get_metric()
            .iter()
            .map(|m| m.get_histogram().get_sample_count())
            .sum();
        assert!(sample_count >= 1);
    }
}
