//! Cache Module
//!
//! Memoizing cache core: per-key memoized slots, the service that places
//! them in an expiring store, and the process-wide manager façade.

mod manager;
mod service;
mod slot;


// Re-export public types
pub use manager::CacheManager;
pub use service::{CacheService, CacheServiceBuilder};
pub use slot::MemoSlot;
