//! `SharedGraphToken` - a thread-safe handle for graph tokens.
//!
//! Several host threads may take turns controlling one dynamic graph. The shared
//! token acts as an `RwLock` over the capability: many concurrent readers may
//! query the graph, and one controller at a time may submit mutation batches.
//!
//! [`SharedGraphToken::with_batch`] is the usual entry point for controllers: the
//! batches issued inside the closure run back to back, with no other
//! controller's batch in between.

use crate::GraphToken;
use std::ops::{Deref, DerefMut};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A lock-guarded graph token that can be shared across controller threads.
pub struct SharedGraphToken<'brand> {
    lock: RwLock<GraphToken<'brand>>,
}

impl<'brand> SharedGraphToken<'brand> {
    /// Consumes the unique token so that exclusive control moves into this handle.
    pub fn new(token: GraphToken<'brand>) -> Self {
        Self {
            lock: RwLock::new(token),
        }
    }

    /// Acquires shared read access.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn read(&self) -> SharedTokenReadGuard<'_, 'brand> {
        SharedTokenReadGuard {
            guard: self.lock.read().expect("SharedGraphToken lock poisoned"),
        }
    }

    /// Acquires exclusive write access for one mutation batch.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn write(&self) -> SharedTokenWriteGuard<'_, 'brand> {
        SharedTokenWriteGuard {
            guard: self.lock.write().expect("SharedGraphToken lock poisoned"),
        }
    }

    /// Runs `submit` as one controller turn under exclusive control.
    ///
    /// Everything `submit` does with the token (typically one or more insert or
    /// delete batches) completes before another controller gets a turn or a
    /// reader gets access.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn with_batch<R>(&self, submit: impl FnOnce(&mut GraphToken<'brand>) -> R) -> R {
        let mut guard = self.write();
        submit(&mut guard)
    }

    /// Runs `query` with shared read access.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn with_query<R>(&self, query: impl FnOnce(&GraphToken<'brand>) -> R) -> R {
        let guard = self.read();
        query(&guard)
    }

    /// Returns the token, ending shared control.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn into_inner(self) -> GraphToken<'brand> {
        self.lock
            .into_inner()
            .expect("SharedGraphToken lock poisoned")
    }
}

/// RAII guard for shared read access to a graph token.
pub struct SharedTokenReadGuard<'a, 'brand> {
    guard: RwLockReadGuard<'a, GraphToken<'brand>>,
}

impl<'a, 'brand> Deref for SharedTokenReadGuard<'a, 'brand> {
    type Target = GraphToken<'brand>;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// RAII guard for exclusive write access to a graph token.
pub struct SharedTokenWriteGuard<'a, 'brand> {
    guard: RwLockWriteGuard<'a, GraphToken<'brand>>,
}

impl<'a, 'brand> Deref for SharedTokenWriteGuard<'a, 'brand> {
    type Target = GraphToken<'brand>;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<'a, 'brand> DerefMut for SharedTokenWriteGuard<'a, 'brand> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}
