//! Test utils for providers.

use rollup_sync_primitives::L1BlockHeader;

pub use arbitrary::Arbitrary;

mod availability;
pub use availability::MockAvailability;

mod broadcast;
pub use broadcast::MockBroadcast;

mod chain;
pub use chain::MockChain;

/// Returns an arbitrary instance of the passed type.
#[macro_export]
macro_rules! random {
    ($typ: ty) => {{
        let mut bytes = Box::new([0u8; 4 * size_of::<$typ>() + 32]);
        let mut rng = ::rand::rng();
        ::rand::RngCore::fill_bytes(&mut rng, bytes.as_mut_slice());
        let mut u = ::arbitrary::Unstructured::new(bytes.as_slice());
        <$typ as $crate::test_utils::Arbitrary>::arbitrary(&mut u).unwrap()
    }};
}

/// Returns a linked chain of random headers of size `len`, numbered from zero.
pub fn chain(len: usize) -> Vec<L1BlockHeader> {
    let mut chain: Vec<L1BlockHeader> = Vec::with_capacity(len);
    for number in 0..len as u64 {
        let parent = chain.last().copied();
        chain.push(next_header(parent.as_ref(), number));
    }
    chain
}

/// Returns a linked chain of `len` random headers following the provided header.
pub fn chain_from(header: &L1BlockHeader, len: usize) -> Vec<L1BlockHeader> {
    let mut blocks = Vec::with_capacity(len);
    let mut parent = *header;
    for _ in 0..len {
        let next = next_header(Some(&parent), parent.number + 1);
        blocks.push(next);
        parent = next;
    }
    blocks
}

fn next_header(parent: Option<&L1BlockHeader>, number: u64) -> L1BlockHeader {
    let mut next = random!(L1BlockHeader);
    next.number = number;
    next.parent_hash = parent.map(|p| p.hash).unwrap_or_default();
    next.received_at = 1_700_000_000 + 12 * number;
    next
}
