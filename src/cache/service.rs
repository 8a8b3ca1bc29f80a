//! Cache Service Module
//!
//! Memoizing front end over an [`ExpiringStore`]: one structural lock for
//! slot bookkeeping, one private lock per slot for value computation.

use std::any::type_name;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::MemoSlot;
use crate::error::{CacheError, Result};
use crate::policy::ExpirationPolicy;
use crate::store::ExpiringStore;

// == Cache Service ==
/// Guarantees a single computed value per key across concurrent callers.
///
/// The structural lock only covers lookup and insertion of slots in the
/// store, never the producing function, so a slow load for one key does not
/// block operations on other keys. Callers racing on the same key wait on
/// that key's slot instead.
pub struct CacheService {
    store: Arc<dyn ExpiringStore>,
    structural: RwLock<()>,
}

impl CacheService {
    /// Binds a new service to `store`. The store is shared, not owned.
    pub fn new(store: Arc<dyn ExpiringStore>) -> Self {
        Self {
            store,
            structural: RwLock::new(()),
        }
    }

    pub fn builder() -> CacheServiceBuilder {
        CacheServiceBuilder::default()
    }

    /// The store this service is bound to.
    pub fn store(&self) -> &Arc<dyn ExpiringStore> {
        &self.store
    }

    // == Contains ==
    /// Whether the store currently holds an entry for `key`.
    ///
    /// Not linearized with a concurrent `get_or_add` inserting the same key.
    pub fn contains(&self, key: &str) -> bool {
        let _read = self.structural.read();
        self.store.contains(key)
    }

    // == Get Or Add ==
    /// Returns the value cached under `key`, computing it with `produce` if
    /// no successful computation has been committed yet.
    ///
    /// `policy` is only called when a new slot is inserted, and runs under
    /// the structural write lock: keep it cheap. An error from `produce` is
    /// returned unchanged and the next call for `key` tries again.
    pub fn get_or_add<T, E, F, P>(
        &self,
        key: &str,
        produce: F,
        policy: P,
    ) -> std::result::Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: From<CacheError>,
        F: FnOnce() -> std::result::Result<T, E>,
        P: FnOnce() -> ExpirationPolicy,
    {
        let slot = self.slot_for::<T, P>(key, policy)?;
        slot.get(produce)
    }

    /// [`CacheService::get_or_add`] for producers that cannot fail.
    pub fn get_or_insert_with<T, F, P>(&self, key: &str, produce: F, policy: P) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
        P: FnOnce() -> ExpirationPolicy,
    {
        self.get_or_add(key, || Ok(produce()), policy)
    }

    /// [`CacheService::get_or_add`] with an optional producer.
    ///
    /// Without a producer the slot is still inserted, but an uncommitted slot
    /// yields `T::default()` and stays uncommitted: a later call that brings
    /// a producer computes the real value. A default coming back here does
    /// not mean a default was cached.
    pub fn get_or_add_optional<T, E, F, P>(
        &self,
        key: &str,
        produce: Option<F>,
        policy: P,
    ) -> std::result::Result<T, E>
    where
        T: Clone + Default + Send + Sync + 'static,
        E: From<CacheError>,
        F: FnOnce() -> std::result::Result<T, E>,
        P: FnOnce() -> ExpirationPolicy,
    {
        let slot = self.slot_for::<T, P>(key, policy)?;
        slot.get_or_default(produce)
    }

    // == Remove ==
    /// Drops the entry for `key`. Returns whether one was present.
    ///
    /// A computation already running against the removed slot finishes for
    /// its own callers, but its value is never visible to later lookups.
    pub fn remove(&self, key: &str) -> bool {
        let _write = self.structural.write();
        let removed = self.store.remove(key).is_some();
        if removed {
            debug!(key, "Removed cache slot");
        }
        removed
    }

    /// Finds the slot for `key`, inserting an empty one if there is none.
    fn slot_for<T, P>(&self, key: &str, policy: P) -> Result<Arc<MemoSlot<T>>>
    where
        T: Send + Sync + 'static,
        P: FnOnce() -> ExpirationPolicy,
    {
        {
            let _read = self.structural.read();
            if let Some(slot) = self.lookup::<T>(key)? {
                return Ok(slot);
            }
        }

        let _write = self.structural.write();
        if let Some(slot) = self.lookup::<T>(key)? {
            return Ok(slot);
        }

        let slot = Arc::new(MemoSlot::<T>::new());
        if self.store.add(key, slot.clone(), policy()) {
            debug!(key, value_type = type_name::<T>(), "Inserted cache slot");
            return Ok(slot);
        }

        // another service bound to the same store inserted first
        debug!(key, "Store already held a slot, adopting it");
        Ok(self.lookup::<T>(key)?.unwrap_or(slot))
    }

    fn lookup<T>(&self, key: &str) -> Result<Option<Arc<MemoSlot<T>>>>
    where
        T: Send + Sync + 'static,
    {
        let Some(entry) = self.store.get(key) else {
            return Ok(None);
        };

        entry.downcast::<MemoSlot<T>>().map(Some).map_err(|_| {
            warn!(key, expected = type_name::<T>(), "Cache slot holds another type");
            CacheError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            }
        })
    }
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService").finish_non_exhaustive()
    }
}

// == Builder ==
/// Builds a [`CacheService`], rejecting a missing store.
#[derive(Default)]
pub struct CacheServiceBuilder {
    store: Option<Arc<dyn ExpiringStore>>,
}

impl CacheServiceBuilder {
    pub fn store(mut self, store: Arc<dyn ExpiringStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// # Errors
    /// [`CacheError::MissingArgument`] if no store was supplied.
    pub fn build(self) -> Result<CacheService> {
        let store = self.store.ok_or(CacheError::MissingArgument("store"))?;
        Ok(CacheService::new(store))
    }
}
