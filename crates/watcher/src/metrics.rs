use metrics::Counter;
use metrics_derive::Metrics;

/// The metrics for the [`super::RollupWatcher`].
#[derive(Metrics, Clone)]
#[metrics(scope = "rollup_watcher")]
pub struct WatcherMetrics {
    /// A counter on the global exit root updates processed.
    pub global_exit_roots: Counter,
    /// A counter on the sequenced batches fetched.
    pub sequenced_batches: Counter,
    /// A counter on the trusted verifications processed.
    pub verified_batches: Counter,
    /// A counter on the batches skipped as already processed.
    pub skipped_batches: Counter,
    /// A counter on the non monotonic block metadata clamped.
    pub clamped_metadata: Counter,
    /// A counter on the logs with an unknown signature.
    pub unknown_events: Counter,
}
