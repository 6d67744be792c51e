//! `Guarded<T>` — state owned behind one exclusive lock.
//!
//! The compute node and every vehicle route slot each own one `Guarded`
//! value.  The wrapper only grants access through a guard: the state cannot
//! be touched without holding its lock.
//!
//! A panic while the lock is held poisons a `std::sync::Mutex`.  `Guarded`
//! recovers the inner value instead of propagating the poison.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct Guarded<T> {
    inner: Mutex<T>,
}

impl<T> Guarded<T> {
    pub fn new(value: T) -> Self {
        Self { inner: Mutex::new(value) }
    }

    /// Acquire the lock for as long as the returned guard lives.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access and release the lock before returning.
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Consume the wrapper and return the state.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
