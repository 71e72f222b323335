//! Default values of the command line arguments.

/// The max retries for the L1 provider.
pub(crate) const L1_PROVIDER_MAX_RETRIES: u32 = 10;

/// The initial backoff for the L1 provider, in milliseconds.
pub(crate) const L1_PROVIDER_INITIAL_BACKOFF: u64 = 100;

/// The default provider compute units per second.
pub(crate) const PROVIDER_COMPUTE_UNITS_PER_SECOND: u64 = 10000;

/// The default interval between two synchronization iterations, in milliseconds.
pub(crate) const DEFAULT_SYNC_INTERVAL_MS: u64 = 1000;

/// The default number of base chain blocks scanned per request.
pub(crate) const DEFAULT_SYNC_CHUNK_SIZE: u64 = 100;

/// The default interval between two preconfirmation polls, in milliseconds. Zero disables the
/// preconfirmations.
pub(crate) const DEFAULT_PRECONFIRMATIONS_INTERVAL_MS: u64 = 0;

/// The default number of attempts to fetch a block from the availability service.
pub(crate) const DEFAULT_AVAILABILITY_ATTEMPTS: usize = 10;

/// The default delay between two attempts to fetch a block from the availability service, in
/// milliseconds.
pub(crate) const DEFAULT_AVAILABILITY_RETRY_DELAY_MS: u64 = 2000;
