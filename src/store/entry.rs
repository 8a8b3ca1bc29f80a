//! Stored Item Module
//!
//! A single store record: the opaque entry plus the policy it was added with.

use chrono::{DateTime, Utc};

use crate::policy::{CachePriority, Expiration, ExpirationPolicy};
use crate::store::StoreEntry;

// == Stored Item ==
/// Represents a single record held by a [`MemoryStore`].
///
/// [`MemoryStore`]: crate::store::MemoryStore
#[derive(Clone)]
pub struct StoredItem {
    /// The opaque entry handed to `add`
    pub entry: StoreEntry,
    /// Policy the entry was added with
    pub policy: ExpirationPolicy,
    /// Insertion time
    pub created_at: DateTime<Utc>,
    /// Last successful read, drives sliding expiration
    pub last_access: DateTime<Utc>,
}

impl StoredItem {
    pub fn new(entry: StoreEntry, policy: ExpirationPolicy, now: DateTime<Utc>) -> Self {
        Self {
            entry,
            policy,
            created_at: now,
            last_access: now,
        }
    }

    // == Is Expired ==
    /// Checks whether the policy considers the item dead at `now`.
    ///
    /// Boundary condition: an item is expired once `now` reaches the absolute
    /// deadline, or once it has been idle for at least the sliding window.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.policy.expiration {
            Expiration::Never => false,
            Expiration::Absolute(at) => now >= at,
            // a clock that moved backwards yields a negative idle time, never expired
            Expiration::Sliding(window) => (now - self.last_access)
                .to_std()
                .map(|idle| idle >= window)
                .unwrap_or(false),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Records a read, extending a sliding window.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_access = now;
    }

    /// Whether the store may drop this item to make room.
    pub fn is_evictable(&self) -> bool {
        self.policy.priority != CachePriority::NotRemovable
    }
}

impl std::fmt::Debug for StoredItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredItem")
            .field("policy", &self.policy)
            .field("created_at", &self.created_at)
            .field("last_access", &self.last_access)
            .finish_non_exhaustive()
    }
}
