use alloy_primitives::{keccak256, B256};

/// Returns the global exit root derived from the mainnet and rollup exit roots.
///
/// The derived root is `keccak256(mainnet_exit_root ‖ rollup_exit_root)`. It is not emitted by the
/// exit root manager and must be recomputed on ingestion.
pub fn derive_global_exit_root(mainnet_exit_root: B256, rollup_exit_root: B256) -> B256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(mainnet_exit_root.as_slice());
    preimage[32..].copy_from_slice(rollup_exit_root.as_slice());
    keccak256(preimage)
}

/// A global exit root update emitted by the exit root manager.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GlobalExitRoot {
    /// The base chain block number of the update.
    pub block_number: u64,
    /// The mainnet exit root.
    pub mainnet_exit_root: B256,
    /// The rollup exit root.
    pub rollup_exit_root: B256,
    /// The derived global exit root.
    pub global_exit_root: B256,
}

impl GlobalExitRoot {
    /// Returns a new [`GlobalExitRoot`], deriving the global root from the two exit roots.
    pub fn new(block_number: u64, mainnet_exit_root: B256, rollup_exit_root: B256) -> Self {
        Self {
            block_number,
            mainnet_exit_root,
            rollup_exit_root,
            global_exit_root: derive_global_exit_root(mainnet_exit_root, rollup_exit_root),
        }
    }
}

#[cfg(feature = "arbitrary")]
impl arbitrary::Arbitrary<'_> for GlobalExitRoot {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        Ok(Self::new(u.int_in_range(0..=u32::MAX)? as u64, u.arbitrary()?, u.arbitrary()?))
    }
}
