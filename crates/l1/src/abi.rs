//! Contract bindings for the rollup, the global exit root manager and the `HotShot` contract.

/// The view calls of the rollup contracts.
pub mod calls;

/// The events emitted by the rollup contracts.
pub mod logs;
