//! Centralized validator settings.
//! Static constants; the CLI maps its flags onto the structs built from them.

/// The installData version this validator understands.
/// Increment it when a breaking change is made to the JSON layout.
pub const SUPPORTED_DOCUMENT_VERSION: i64 = 2;

// Reachability probing
pub const PROBE_BYTES: u64 = 1024;
pub const REQUEST_TIMEOUT_SECS: u64 = 20;
pub const MAX_PROBE_ATTEMPTS: u32 = 8;
pub const RETRY_BACKOFF_MIN_MS: u64 = 4000;
pub const RETRY_BACKOFF_MAX_MS: u64 = 6000;
pub const MAX_CONNECTIONS_PER_HOST: usize = 2;
pub const MAX_IN_FLIGHT: usize = 8;

/// A body larger than `PROBE_BYTES * OVERSIZE_FACTOR` means the server ignored the range header.
pub const OVERSIZE_FACTOR: u64 = 4;
