use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::Synchronizer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "rollup_synchronizer")]
pub struct SynchronizerMetrics {
    /// A counter on the base chain blocks stored.
    pub blocks_processed: Counter,
    /// A counter on the reorgs handled.
    pub reorgs: Counter,
    /// The depth of the handled reorgs.
    pub reorg_depth: Histogram,
    /// A counter on the trusted batches replayed.
    pub trusted_batches_reconciled: Counter,
    /// A counter on the local batches replaced by the trusted state.
    pub trusted_reorgs: Counter,
    /// A counter on the preconfirmed batches stored.
    pub preconfirmation_batches: Counter,
}
