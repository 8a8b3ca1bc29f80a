//! Cache Manager Module
//!
//! Process-wide convenience façade over a default [`MemoryStore`] and the
//! [`CacheService`] bound to it.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::cache::CacheService;
use crate::config::Config;
use crate::error::CacheError;
use crate::policy::ExpirationPolicy;
use crate::store::{ExpiringStore, MemoryStore};

static INSTANCE: OnceLock<CacheManager> = OnceLock::new();

// == Cache Manager ==
/// Default store plus default service, with argument-plumbing shortcuts.
///
/// Prefer constructing a [`CacheService`] and passing it around; the global
/// [`CacheManager::instance`] exists for call sites that cannot be handed one.
pub struct CacheManager {
    store: Arc<MemoryStore>,
    service: CacheService,
}

impl CacheManager {
    /// The process-wide manager.
    ///
    /// Built from [`Config::from_env`] on first access, exactly once even when
    /// several threads race to it, and never torn down.
    pub fn instance() -> &'static CacheManager {
        INSTANCE.get_or_init(|| {
            let config = Config::from_env();
            info!(
                max_entries = config.max_entries,
                "Initializing process-wide cache manager"
            );
            Self::new(&config)
        })
    }

    pub fn new(config: &Config) -> Self {
        Self::with_store(Arc::new(MemoryStore::from_config(config)))
    }

    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        let service = CacheService::new(store.clone());
        Self { store, service }
    }

    /// The default store, e.g. for stats or for driving its cleanup task.
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub fn service(&self) -> &CacheService {
        &self.service
    }

    /// Cached value for `key` in the default store, never expiring.
    pub fn get_cached<T, E, F>(&self, key: &str, produce: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: From<CacheError>,
        F: FnOnce() -> Result<T, E>,
    {
        self.service
            .get_or_add(key, produce, ExpirationPolicy::no_expiration)
    }

    /// Cached value for `key` in the default store, with an explicit policy.
    pub fn get_cached_with_policy<T, E, F, P>(
        &self,
        key: &str,
        produce: F,
        policy: P,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: From<CacheError>,
        F: FnOnce() -> Result<T, E>,
        P: FnOnce() -> ExpirationPolicy,
    {
        self.service.get_or_add(key, produce, policy)
    }

    /// Cached value for `key` in a caller-supplied store.
    ///
    /// Each call binds a fresh service to `store`, so structural operations
    /// are not serialized across calls; the store's own atomic `add` keeps a
    /// single slot per key.
    pub fn get_cached_in<T, E, F, P>(
        &self,
        key: &str,
        produce: F,
        store: Arc<dyn ExpiringStore>,
        policy: P,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: From<CacheError>,
        F: FnOnce() -> Result<T, E>,
        P: FnOnce() -> ExpirationPolicy,
    {
        CacheService::new(store).get_or_add(key, produce, policy)
    }

    /// See [`ExpirationPolicy::create`].
    pub fn create_policy(
        sliding: Option<Duration>,
        absolute: Option<DateTime<Utc>>,
    ) -> ExpirationPolicy {
        ExpirationPolicy::create(sliding, absolute)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn manager() -> CacheManager {
        CacheManager::new(&Config::default())
    }

    #[test]
    fn test_get_cached_uses_default_store() {
        let manager = manager();

        let value = manager.get_cached("greeting", || Ok::<_, CacheError>("hi".to_string()));
        assert_eq!(value.as_deref(), Ok("hi"));
        assert!(manager.store().contains("greeting"));
        assert!(manager.service().contains("greeting"));
    }

    #[test]
    fn test_get_cached_with_policy() {
        let manager = manager();
        let policy = || CacheManager::create_policy(Some(Duration::from_secs(60)), None);

        let value = manager.get_cached_with_policy("k", || Ok::<_, CacheError>(3u8), policy);
        assert_eq!(value, Ok(3));
        let again = manager.get_cached_with_policy("k", || Ok::<_, CacheError>(4u8), policy);
        assert_eq!(again, Ok(3));
    }

    #[test]
    fn test_get_cached_in_isolated_store() {
        let manager = manager();
        let isolated = Arc::new(MemoryStore::unbounded());
        let calls = AtomicUsize::new(0);
        let produce = || Ok::<_, CacheError>(calls.fetch_add(1, Ordering::SeqCst));

        manager
            .get_cached_in("k", produce, isolated.clone(), ExpirationPolicy::no_expiration)
            .unwrap();
        manager
            .get_cached_in("k", produce, isolated.clone(), ExpirationPolicy::no_expiration)
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(isolated.contains("k"));
        assert!(!manager.store().contains("k"));
    }

    #[test]
    fn test_instance_is_published_once() {
        let addresses: Vec<usize> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| CacheManager::instance() as *const CacheManager as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
        assert!(std::ptr::eq(CacheManager::instance(), CacheManager::instance()));
    }
}
