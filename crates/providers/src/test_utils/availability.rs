use crate::{AvailabilityError, AvailabilityProvider, SequencerBlock};

use parking_lot::Mutex;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

#[derive(Debug, Default)]
struct AvailabilityState {
    blocks: BTreeMap<u64, SequencerBlock>,
    height: u64,
    failures: HashMap<u64, usize>,
    malformed: HashSet<u64>,
    requests: HashMap<u64, usize>,
}

/// An in-memory availability service.
///
/// The reported height is one past the highest block pushed unless overridden.
#[derive(Debug, Clone, Default)]
pub struct MockAvailability {
    state: Arc<Mutex<AvailabilityState>>,
}

impl MockAvailability {
    /// Serves the block at its height.
    pub fn push_block(&self, block: SequencerBlock) {
        let mut state = self.state.lock();
        state.height = state.height.max(block.height + 1);
        state.blocks.insert(block.height, block);
    }

    /// Overrides the reported block height.
    pub fn set_height(&self, height: u64) {
        self.state.lock().height = height;
    }

    /// Makes the next `count` requests for the block fail.
    pub fn fail_block(&self, height: u64, count: usize) {
        self.state.lock().failures.insert(height, count);
    }

    /// Makes the block payload undecodable.
    pub fn set_malformed(&self, height: u64) {
        self.state.lock().malformed.insert(height);
    }

    /// Returns the count of requests made for the block.
    pub fn requests(&self, height: u64) -> usize {
        self.state.lock().requests.get(&height).copied().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl AvailabilityProvider for MockAvailability {
    async fn block_height(&self) -> Result<u64, AvailabilityError> {
        Ok(self.state.lock().height)
    }

    async fn block(&self, height: u64) -> Result<SequencerBlock, AvailabilityError> {
        let mut state = self.state.lock();
        *state.requests.entry(height).or_default() += 1;

        if let Some(remaining) = state.failures.get_mut(&height).filter(|r| **r > 0) {
            *remaining -= 1;
            return Err(AvailabilityError::Unavailable(height));
        }
        if state.malformed.contains(&height) {
            return Err(serde_json::from_str::<SequencerBlock>("{").unwrap_err().into());
        }
        state.blocks.get(&height).cloned().ok_or(AvailabilityError::Unavailable(height))
    }
}
