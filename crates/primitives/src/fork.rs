/// The batch range over which a fork id applies.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ForkIdInterval {
    /// The first batch of the fork.
    pub from_batch_number: u64,
    /// The last batch of the fork, `u64::MAX` for the active fork.
    pub to_batch_number: u64,
    /// The fork id.
    pub fork_id: u64,
    /// The version string of the fork.
    pub version: String,
}
