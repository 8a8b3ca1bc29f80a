//! Expiration Policy Module
//!
//! Describes how long a store should keep an entry alive.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Expiration ==
/// When an entry stops being live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Expiration {
    /// Lives until removed or evicted for unrelated reasons
    #[default]
    Never,
    /// Expires once it has not been read for the given duration
    Sliding(Duration),
    /// Expires at a fixed wall-clock time regardless of access
    Absolute(DateTime<Utc>),
}

// == Cache Priority ==
/// Eviction priority handed to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CachePriority {
    /// May be evicted when the store runs out of room
    #[default]
    Default,
    /// Never evicted for capacity; only expiry or explicit removal drop it
    NotRemovable,
}

// == Expiration Policy ==
/// Policy supplied to the store alongside each inserted entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpirationPolicy {
    pub expiration: Expiration,
    pub priority: CachePriority,
}

impl ExpirationPolicy {
    /// A policy that never expires.
    pub fn no_expiration() -> Self {
        Self::default()
    }

    /// Builds a policy from optional sliding and absolute inputs.
    ///
    /// An absolute timestamp wins when both are supplied. With neither, the
    /// entry never expires. Priority is always [`CachePriority::Default`].
    pub fn create(sliding: Option<Duration>, absolute: Option<DateTime<Utc>>) -> Self {
        let expiration = match (absolute, sliding) {
            (Some(at), _) => Expiration::Absolute(at),
            (None, Some(window)) => Expiration::Sliding(window),
            (None, None) => Expiration::Never,
        };

        Self {
            expiration,
            priority: CachePriority::Default,
        }
    }

    pub fn sliding(window: Duration) -> Self {
        Self::create(Some(window), None)
    }

    pub fn absolute(at: DateTime<Utc>) -> Self {
        Self::create(None, Some(at))
    }

    /// Returns a copy with a different eviction priority.
    pub fn with_priority(mut self, priority: CachePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn sliding_expiration(&self) -> Option<Duration> {
        match self.expiration {
            Expiration::Sliding(window) => Some(window),
            _ => None,
        }
    }

    pub fn absolute_expiration(&self) -> Option<DateTime<Utc>> {
        match self.expiration {
            Expiration::Absolute(at) => Some(at),
            _ => None,
        }
    }

    pub fn expires(&self) -> bool {
        self.expiration != Expiration::Never
    }
}

/// Free-function form of [`ExpirationPolicy::create`].
pub fn create_policy(sliding: Option<Duration>, absolute: Option<DateTime<Utc>>) -> ExpirationPolicy {
    ExpirationPolicy::create(sliding, absolute)
}
