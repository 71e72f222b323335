//! Command line arguments and launch helpers of the rollup synchronizer.
//!
//! The crate does not pick a store. A binary for a concrete store parses [`RollupSyncArgs`],
//! calls [`init_tracing`] and hands the store to [`launch`].

mod args;
pub use args::{
    ContractArgs, L1ProviderArgs, PreconfirmationArgs, RollupSyncArgs, RpcSynchronizer,
    SynchronizerArgs,
};

mod constants;

use rollup_sync_state::{Genesis, PendingTxManager, StateProvider};

/// Initializes the tracing subscriber, filtering with `RUST_LOG` and defaulting to `info`.
pub fn init_tracing() -> eyre::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(false),
        )
        .with(filter)
        .try_init()?;
    Ok(())
}

/// Builds the synchronizer over the provided store and runs it until it fails or ctrl-c is
/// received.
pub async fn launch<S, M>(
    args: RollupSyncArgs,
    state: S,
    tx_manager: M,
    genesis: Genesis,
) -> eyre::Result<()>
where
    S: StateProvider + Clone + 'static,
    M: PendingTxManager<S::Tx> + 'static,
{
    let synchronizer = args.build(state, tx_manager, genesis);
    let handle = synchronizer.handle();
    let mut task = tokio::spawn(synchronizer.sync());

    tracing::info!(target: "rollup::node", "Launched synchronizer");
    tokio::select! {
        res = &mut task => return Ok(res??),
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!(target: "rollup::node", "Received ctrl-c, stopping synchronizer");
            handle.stop();
        }
    }

    Ok(task.await??)
}
