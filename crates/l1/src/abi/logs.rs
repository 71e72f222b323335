#![allow(missing_docs)]

use alloy_sol_types::sol;

// Global exit root manager.
sol! {
    #[cfg_attr(feature = "test-utils", derive(arbitrary::Arbitrary))]
    #[derive(Debug, PartialEq, Eq)]
    event UpdateGlobalExitRoot(bytes32 indexed mainnetExitRoot, bytes32 indexed rollupExitRoot);
}

// HotShot contract.
sol! {
    #[cfg_attr(feature = "test-utils", derive(arbitrary::Arbitrary))]
    #[derive(Debug, PartialEq, Eq)]
    event NewBlocks(uint256 firstBlockNumber, uint256 numBlocks);
}

// Rollup contract.
sol! {
    #[cfg_attr(feature = "test-utils", derive(arbitrary::Arbitrary))]
    #[derive(Debug, PartialEq, Eq)]
    event SequenceBatches(uint64 indexed numBatch);

    #[cfg_attr(feature = "test-utils", derive(arbitrary::Arbitrary))]
    #[derive(Debug, PartialEq, Eq)]
    event VerifyBatches(uint64 indexed numBatch, bytes32 stateRoot, address indexed aggregator);

    #[cfg_attr(feature = "test-utils", derive(arbitrary::Arbitrary))]
    #[derive(Debug, PartialEq, Eq)]
    event VerifyBatchesTrustedAggregator(
        uint64 indexed numBatch,
        bytes32 stateRoot,
        address indexed aggregator
    );

    #[derive(Debug, PartialEq, Eq)]
    event SetTrustedSequencerURL(string newTrustedSequencerURL);

    #[derive(Debug, PartialEq, Eq)]
    event SetTrustedSequencer(address newTrustedSequencer);

    #[derive(Debug, PartialEq, Eq)]
    event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

    #[derive(Debug, PartialEq, Eq)]
    event SetSecurityCouncil(address newSecurityCouncil);

    #[derive(Debug, PartialEq, Eq)]
    event ProofDifferentState(bytes32 storedStateRoot, bytes32 provedStateRoot);

    #[derive(Debug, PartialEq, Eq)]
    event EmergencyStateActivated();

    #[derive(Debug, PartialEq, Eq)]
    event EmergencyStateDeactivated();

    #[derive(Debug, PartialEq, Eq)]
    event UpdateZkEVMVersion(uint64 numBatch, uint64 forkID, string version);
}

// Proxy lifecycle.
sol! {
    #[derive(Debug, PartialEq, Eq)]
    event Initialized(uint8 version);

    #[derive(Debug, PartialEq, Eq)]
    event AdminChanged(address previousAdmin, address newAdmin);

    #[derive(Debug, PartialEq, Eq)]
    event BeaconUpgraded(address indexed beacon);

    #[derive(Debug, PartialEq, Eq)]
    event Upgraded(address indexed implementation);
}
