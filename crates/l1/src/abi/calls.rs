#![allow(missing_docs)]

use alloy_sol_types::sol;

// Global exit root manager.
sol! {
    #[derive(Debug, PartialEq, Eq)]
    function getLastGlobalExitRoot() external view returns (bytes32);
}

// Rollup contract.
sol! {
    #[derive(Debug, PartialEq, Eq)]
    function lastBatchSequenced() external view returns (uint64);

    #[derive(Debug, PartialEq, Eq)]
    function lastVerifiedBatch() external view returns (uint64);

    #[derive(Debug, PartialEq, Eq)]
    function trustedSequencer() external view returns (address);

    #[derive(Debug, PartialEq, Eq)]
    function trustedSequencerURL() external view returns (string);
}
