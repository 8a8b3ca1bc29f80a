//! Store Module
//!
//! The expiring key/value store interface consumed by the cache service, and
//! the default in-memory implementation.

mod entry;
mod lru;
mod memory;
mod stats;

use std::any::Any;
use std::sync::Arc;

use crate::policy::ExpirationPolicy;

// Re-export public types
pub use entry::StoredItem;
pub use lru::LruTracker;
pub use memory::MemoryStore;
pub use stats::StoreStats;

/// Opaque value held by a store. The cache service stores its memoized
/// slots here and downcasts them on the way out.
pub type StoreEntry = Arc<dyn Any + Send + Sync>;

// == Expiring Store ==
/// A key/value container that evicts entries according to the policy they
/// were added with.
///
/// Implementations must be internally synchronized; the cache service only
/// serializes its own structural operations against them.
pub trait ExpiringStore: Send + Sync {
    /// Whether a live entry exists for `key`.
    fn contains(&self, key: &str) -> bool;

    /// Returns the live entry for `key`, if any.
    fn get(&self, key: &str) -> Option<StoreEntry>;

    /// Inserts `entry` if `key` is absent. Returns false when a live entry
    /// was already present and left in place.
    fn add(&self, key: &str, entry: StoreEntry, policy: ExpirationPolicy) -> bool;

    /// Removes the entry for `key`, returning it if one was present.
    fn remove(&self, key: &str) -> Option<StoreEntry>;
}
