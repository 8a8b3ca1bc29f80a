//! Memoized Slot Module
//!
//! Per-key holder that computes its value at most once to successful
//! completion, using double-checked locking.

use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::{trace, warn};

// == Memo Slot ==
/// Lazily computed value for a single cache key.
///
/// Reads of a committed value take no lock: `value` is published with
/// release/acquire ordering once the producing function succeeds. Callers
/// that find the slot empty serialize on a lock private to this slot, so a
/// slow computation only blocks callers of the same key.
///
/// A producing function that fails (returns `Err` or panics) leaves the slot
/// uncommitted and the next caller runs its own producer.
pub struct MemoSlot<T> {
    value: OnceLock<T>,
    compute_lock: Mutex<()>,
}

impl<T> MemoSlot<T> {
    /// Creates an empty, uncommitted slot.
    pub fn new() -> Self {
        Self {
            value: OnceLock::new(),
            compute_lock: Mutex::new(()),
        }
    }

    /// Whether a value has been committed.
    pub fn is_computed(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T: Clone> MemoSlot<T> {
    // == Get ==
    /// Returns the committed value, running `produce` first if there is none.
    ///
    /// An error from `produce` is returned as is and nothing is committed.
    pub fn get<F, E>(&self, produce: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.value.get() {
            trace!("Memo slot hit");
            return Ok(value.clone());
        }

        let _guard = self.compute_lock.lock();
        // another caller may have committed while we waited
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }

        match produce() {
            Ok(value) => {
                // only ever set under `compute_lock`, so this cannot already be full
                let _ = self.value.set(value.clone());
                Ok(value)
            }
            Err(err) => {
                warn!("Producing function failed, slot left uncommitted");
                Err(err)
            }
        }
    }

    /// Returns the committed value without computing anything.
    pub fn peek(&self) -> Option<T> {
        self.value.get().cloned()
    }
}

impl<T: Clone + Default> MemoSlot<T> {
    // == Get Or Default ==
    /// Variant of [`MemoSlot::get`] whose producer may be absent.
    ///
    /// With no producer an uncommitted slot yields `T::default()` and stays
    /// uncommitted, so a later caller that does bring a producer still
    /// computes the real value. This waits for a computation already running
    /// on another thread before deciding.
    pub fn get_or_default<F, E>(&self, produce: Option<F>) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        match produce {
            Some(produce) => self.get(produce),
            None => {
                if let Some(value) = self.value.get() {
                    return Ok(value.clone());
                }

                let _guard = self.compute_lock.lock();
                Ok(self.value.get().cloned().unwrap_or_default())
            }
        }
    }
}

impl<T> Default for MemoSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for MemoSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoSlot")
            .field("value", &self.value.get())
            .finish()
    }
}
