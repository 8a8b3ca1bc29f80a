//! Memo Cache - a concurrency-safe memoizing cache
//!
//! Given a key and a producing function, [`CacheService::get_or_add`] makes
//! concurrent callers share a single computed value per key, running the
//! producer at most once to success while the entry is live.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use memo_cache::{CacheService, ExpirationPolicy, MemoryStore};
//!
//! let cache = CacheService::new(Arc::new(MemoryStore::new(1000)));
//! let name = cache.get_or_insert_with(
//!     "user:1",
//!     || "Alice".to_string(),
//!     || ExpirationPolicy::sliding(Duration::from_secs(300)),
//! )?;
//! assert_eq!(name, "Alice");
//! # Ok::<(), memo_cache::CacheError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod policy;
pub mod store;
pub mod tasks;

pub use cache::{CacheManager, CacheService, CacheServiceBuilder, MemoSlot};
pub use config::Config;
pub use error::{CacheError, Result};
pub use policy::{create_policy, CachePriority, Expiration, ExpirationPolicy};
pub use store::{ExpiringStore, MemoryStore, StoreEntry, StoreStats};
pub use tasks::spawn_cleanup_task;
