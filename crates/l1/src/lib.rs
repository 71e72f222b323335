//! A library containing the contract interfaces of the rollup on the base chain.

pub mod abi;

mod event;
pub use event::{AdminEvent, RollupEvent, RollupEventError};
