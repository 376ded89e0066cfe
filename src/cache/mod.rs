// Cache module for keyed response caching.
// Stores raw commits responses keyed by request descriptor, on disk or in memory.

pub mod memory;
pub mod paths;
pub mod store;

pub use memory::MemoryCache;
pub use store::DiskCache;

use crate::error::Result;

/// Name of the partition commits responses are cached in.
pub const DEFAULT_PARTITION: &str = "repos";

/// Key-value store of raw response bodies, keyed by request descriptor.
pub trait KeyedCache: Send + Sync {
    /// Look up the body stored for `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `body` under `key`, replacing any previous entry.
    fn put(&self, key: &str, body: &[u8]) -> Result<()>;
}
