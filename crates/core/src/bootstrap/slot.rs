use serde::Serialize;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Resolution state of a [`GuardedSlot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Unresolved,
    Resolving,
    Resolved,
}

/// A lazily resolved value that never blocks its readers.
///
/// At most one caller runs the resolution. A caller arriving while it is in
/// flight, from another thread or reentrantly from the resolution itself,
/// gets `None` and is expected to use a fallback. The lock is held only to
/// flip the state, never while resolving.
pub struct GuardedSlot<T: ?Sized> {
    value: OnceLock<Arc<T>>,
    state: Mutex<SlotState>,
}

impl<T: ?Sized> GuardedSlot<T> {
    pub fn new() -> Self {
        Self {
            value: OnceLock::new(),
            state: Mutex::new(SlotState::Unresolved),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached value, if resolved
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.get().cloned()
    }

    pub fn state(&self) -> SlotState {
        *self.lock()
    }

    /// Resolve once with an infallible resolution
    pub fn resolve(&self, resolve: impl FnOnce() -> Arc<T>) -> Option<Arc<T>> {
        match self.try_resolve(|| Ok::<_, Infallible>(resolve())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Resolve once. A failed resolution leaves the slot unresolved.
    pub fn try_resolve<E>(&self, resolve: impl FnOnce() -> Result<Arc<T>, E>) -> Result<Option<Arc<T>>, E> {
        if let Some(value) = self.value.get() {
            return Ok(Some(Arc::clone(value)));
        }

        {
            let mut state = self.lock();
            match *state {
                SlotState::Resolving => return Ok(None),
                SlotState::Resolved => return Ok(self.get()),
                SlotState::Unresolved => *state = SlotState::Resolving,
            }
        }

        let mut pending = Pending {
            slot: self,
            done: false,
        };
        let value = resolve()?;
        let value = Arc::clone(self.value.get_or_init(|| value));
        *self.lock() = SlotState::Resolved;
        pending.done = true;
        Ok(Some(value))
    }
}

impl<T: ?Sized> Default for GuardedSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Puts the slot back to unresolved if resolution fails or unwinds
struct Pending<'a, T: ?Sized> {
    slot: &'a GuardedSlot<T>,
    done: bool,
}

impl<T: ?Sized> Drop for Pending<'_, T> {
    fn drop(&mut self) {
        if !self.done {
            *self.slot.lock() = SlotState::Unresolved;
        }
    }
}
