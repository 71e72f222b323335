use crate::abi::logs::{
    AdminChanged, BeaconUpgraded, EmergencyStateActivated, EmergencyStateDeactivated,
    Initialized, NewBlocks, OwnershipTransferred, ProofDifferentState, SequenceBatches,
    SetSecurityCouncil, SetTrustedSequencer, SetTrustedSequencerURL, UpdateGlobalExitRoot,
    UpdateZkEVMVersion, Upgraded, VerifyBatches, VerifyBatchesTrustedAggregator,
};
use alloy_primitives::{Log, B256};
use alloy_sol_types::SolEvent;

/// An error decoding a rollup log.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode {log_type} log: {error}")]
pub struct RollupEventError {
    /// The event the log was matched against.
    pub log_type: &'static str,
    /// The underlying ABI error.
    #[source]
    pub error: alloy_sol_types::Error,
}

/// A log emitted by one of the rollup contracts, decoded by its first topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollupEvent {
    /// New exit roots were published on the global exit root manager.
    UpdateGlobalExitRoot(UpdateGlobalExitRoot),
    /// A range of L2 blocks was committed to the `HotShot` contract.
    NewBlocks(NewBlocks),
    /// Batches were verified by the trusted aggregator.
    VerifyBatchesTrustedAggregator(VerifyBatchesTrustedAggregator),
    /// Batches were verified by a permissionless aggregator.
    VerifyBatches(VerifyBatches),
    /// Batches were sequenced on the rollup contract.
    SequenceBatches(SequenceBatches),
    /// An administrative event without effect on the synchronized state.
    Admin(AdminEvent),
    /// A log with an unrecognized (or missing) first topic.
    Unknown(Option<B256>),
}

/// Administrative events that are only observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminEvent {
    /// [`SetTrustedSequencerURL`].
    SetTrustedSequencerUrl(SetTrustedSequencerURL),
    /// [`SetTrustedSequencer`].
    SetTrustedSequencer(SetTrustedSequencer),
    /// [`OwnershipTransferred`].
    OwnershipTransferred(OwnershipTransferred),
    /// [`SetSecurityCouncil`].
    SetSecurityCouncil(SetSecurityCouncil),
    /// [`ProofDifferentState`].
    ProofDifferentState(ProofDifferentState),
    /// [`EmergencyStateActivated`].
    EmergencyStateActivated,
    /// [`EmergencyStateDeactivated`].
    EmergencyStateDeactivated,
    /// [`UpdateZkEVMVersion`].
    UpdateZkEvmVersion(UpdateZkEVMVersion),
    /// [`Initialized`].
    Initialized(Initialized),
    /// [`AdminChanged`].
    AdminChanged(AdminChanged),
    /// [`BeaconUpgraded`].
    BeaconUpgraded(BeaconUpgraded),
    /// [`Upgraded`].
    Upgraded(Upgraded),
}

impl AdminEvent {
    /// Returns the name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetTrustedSequencerUrl(_) => "SetTrustedSequencerURL",
            Self::SetTrustedSequencer(_) => "SetTrustedSequencer",
            Self::OwnershipTransferred(_) => "OwnershipTransferred",
            Self::SetSecurityCouncil(_) => "SetSecurityCouncil",
            Self::ProofDifferentState(_) => "ProofDifferentState",
            Self::EmergencyStateActivated => "EmergencyStateActivated",
            Self::EmergencyStateDeactivated => "EmergencyStateDeactivated",
            Self::UpdateZkEvmVersion(_) => "UpdateZkEVMVersion",
            Self::Initialized(_) => "Initialized",
            Self::AdminChanged(_) => "AdminChanged",
            Self::BeaconUpgraded(_) => "BeaconUpgraded",
            Self::Upgraded(_) => "Upgraded",
        }
    }
}

fn decode<T: SolEvent>(log: &Log, log_type: &'static str) -> Result<T, RollupEventError> {
    T::decode_log(log).map(|log| log.data).map_err(|error| RollupEventError { log_type, error })
}

impl RollupEvent {
    /// Decodes the log by matching its first topic against the known event signatures.
    pub fn try_decode(log: &Log) -> Result<Self, RollupEventError> {
        let Some(topic) = log.topics().first().copied() else { return Ok(Self::Unknown(None)) };

        let event = match topic {
            UpdateGlobalExitRoot::SIGNATURE_HASH => {
                Self::UpdateGlobalExitRoot(decode(log, "UpdateGlobalExitRoot")?)
            }
            NewBlocks::SIGNATURE_HASH => Self::NewBlocks(decode(log, "NewBlocks")?),
            VerifyBatchesTrustedAggregator::SIGNATURE_HASH => Self::VerifyBatchesTrustedAggregator(
                decode(log, "VerifyBatchesTrustedAggregator")?,
            ),
            VerifyBatches::SIGNATURE_HASH => Self::VerifyBatches(decode(log, "VerifyBatches")?),
            SequenceBatches::SIGNATURE_HASH => {
                Self::SequenceBatches(decode(log, "SequenceBatches")?)
            }
            SetTrustedSequencerURL::SIGNATURE_HASH => Self::Admin(
                AdminEvent::SetTrustedSequencerUrl(decode(log, "SetTrustedSequencerURL")?),
            ),
            SetTrustedSequencer::SIGNATURE_HASH => {
                Self::Admin(AdminEvent::SetTrustedSequencer(decode(log, "SetTrustedSequencer")?))
            }
            OwnershipTransferred::SIGNATURE_HASH => {
                Self::Admin(AdminEvent::OwnershipTransferred(decode(log, "OwnershipTransferred")?))
            }
            SetSecurityCouncil::SIGNATURE_HASH => {
                Self::Admin(AdminEvent::SetSecurityCouncil(decode(log, "SetSecurityCouncil")?))
            }
            ProofDifferentState::SIGNATURE_HASH => {
                Self::Admin(AdminEvent::ProofDifferentState(decode(log, "ProofDifferentState")?))
            }
            EmergencyStateActivated::SIGNATURE_HASH => {
                Self::Admin(AdminEvent::EmergencyStateActivated)
            }
            EmergencyStateDeactivated::SIGNATURE_HASH => {
                Self::Admin(AdminEvent::EmergencyStateDeactivated)
            }
            UpdateZkEVMVersion::SIGNATURE_HASH => {
                Self::Admin(AdminEvent::UpdateZkEvmVersion(decode(log, "UpdateZkEVMVersion")?))
            }
            Initialized::SIGNATURE_HASH => {
                Self::Admin(AdminEvent::Initialized(decode(log, "Initialized")?))
            }
            AdminChanged::SIGNATURE_HASH => {
                Self::Admin(AdminEvent::AdminChanged(decode(log, "AdminChanged")?))
            }
            BeaconUpgraded::SIGNATURE_HASH => {
                Self::Admin(AdminEvent::BeaconUpgraded(decode(log, "BeaconUpgraded")?))
            }
            Upgraded::SIGNATURE_HASH => Self::Admin(AdminEvent::Upgraded(decode(log, "Upgraded")?)),
            other => Self::Unknown(Some(other)),
        };

        Ok(event)
    }

    /// Returns the name of the decoded event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UpdateGlobalExitRoot(_) => "UpdateGlobalExitRoot",
            Self::NewBlocks(_) => "NewBlocks",
            Self::VerifyBatchesTrustedAggregator(_) => "VerifyBatchesTrustedAggregator",
            Self::VerifyBatches(_) => "VerifyBatches",
            Self::SequenceBatches(_) => "SequenceBatches",
            Self::Admin(admin) => admin.name(),
            Self::Unknown(_) => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, Address, U256};

    const ROLLUP: Address = address!("0x610178dA211FEF7D417bC0e6FeD39F05609AD788");

    #[test]
    fn test_decode_global_exit_root() {
        let event = UpdateGlobalExitRoot {
            mainnetExitRoot: b256!(
                "0x1111111111111111111111111111111111111111111111111111111111111111"
            ),
            rollupExitRoot: b256!(
                "0x2222222222222222222222222222222222222222222222222222222222222222"
            ),
        };
        let log = Log { address: ROLLUP, data: event.encode_log_data() };

        let decoded = RollupEvent::try_decode(&log).unwrap();
        assert_eq!(decoded, RollupEvent::UpdateGlobalExitRoot(event));
        assert_eq!(decoded.name(), "UpdateGlobalExitRoot");
    }

    #[test]
    fn test_decode_new_blocks() {
        let event = NewBlocks { firstBlockNumber: U256::from(11), numBlocks: U256::from(2) };
        let log = Log { address: ROLLUP, data: event.encode_log_data() };

        assert_eq!(RollupEvent::try_decode(&log).unwrap(), RollupEvent::NewBlocks(event));
    }

    #[test]
    fn test_decode_admin_event() {
        let log = Log { address: ROLLUP, data: EmergencyStateActivated {}.encode_log_data() };

        let decoded = RollupEvent::try_decode(&log).unwrap();
        assert_eq!(decoded, RollupEvent::Admin(AdminEvent::EmergencyStateActivated));
        assert_eq!(decoded.name(), "EmergencyStateActivated");
    }

    #[test]
    fn test_decode_unknown_topic() {
        let topic = b256!("0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef");
        let log = Log::new_unchecked(ROLLUP, vec![topic], Default::default());

        assert_eq!(RollupEvent::try_decode(&log).unwrap(), RollupEvent::Unknown(Some(topic)));
    }

    #[test]
    fn test_decode_malformed_log() {
        // The verify event requires two indexed topics.
        let log =
            Log::new_unchecked(ROLLUP, vec![VerifyBatches::SIGNATURE_HASH], Default::default());

        let err = RollupEvent::try_decode(&log).unwrap_err();
        assert_eq!(err.log_type, "VerifyBatches");
    }
}
