//! Residency-tagged buffers.
//!
//! Every array that crosses an operation boundary travels as a [`Buffer`], which
//! carries both its owned storage and the memory domain that holds the
//! authoritative copy. Moving between domains is always explicit (`move_to`) or
//! scoped (`stage`); nothing migrates implicitly.

mod staged;

pub use staged::Staged;

use core::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Memory domain holding a buffer's authoritative data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Residency {
    /// Controlling-thread memory.
    Host,
    /// Primary compute memory; batch kernels read from here.
    #[default]
    Device,
}

/// An owned, typed array tagged with its residency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer<T> {
    data: Vec<T>,
    residency: Residency,
}

impl<T> Buffer<T> {
    /// Wraps `data` as resident in `residency`.
    pub fn from_vec(data: Vec<T>, residency: Residency) -> Self {
        Self { data, residency }
    }

    /// Wraps host-resident data.
    pub fn host(data: Vec<T>) -> Self {
        Self::from_vec(data, Residency::Host)
    }

    /// Wraps device-resident data.
    pub fn device(data: Vec<T>) -> Self {
        Self::from_vec(data, Residency::Device)
    }

    /// Current residency.
    #[inline]
    pub fn residency(&self) -> Residency {
        self.residency
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrows the elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Frees the storage. The handle is consumed, so it cannot be used afterwards.
    pub fn release(self) {
        trace_event!(
            len = self.data.len(),
            residency = ?self.residency,
            "buffer released"
        );
        drop(self.data);
    }

    /// Unwraps the storage, discarding the residency tag.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Clone> Buffer<T> {
    /// Makes `target` the authoritative residency.
    ///
    /// A no-op when already resident; otherwise the data is copied into a fresh
    /// allocation in the target domain and the old copy is released.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`] if the destination copy cannot be reserved.
    pub fn move_to(&mut self, target: Residency) -> GraphResult<()> {
        if self.residency == target {
            return Ok(());
        }
        let copy = copy_of(&self.data)?;
        debug_event!(
            len = copy.len(),
            from = ?self.residency,
            to = ?target,
            "buffer moved"
        );
        self.data = copy;
        self.residency = target;
        Ok(())
    }

    /// Returns a view of the data resident in `target` for the duration of a scope.
    ///
    /// Borrows in place when residency already matches; otherwise stages an owned
    /// copy that is released when the returned guard drops, on every exit path.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`] if the staging copy cannot be reserved.
    pub fn stage(&self, target: Residency) -> GraphResult<Staged<'_, T>> {
        if self.residency == target {
            return Ok(Staged::borrowed(&self.data, target));
        }
        let copy = copy_of(&self.data)?;
        debug_event!(len = copy.len(), to = ?target, "buffer staged");
        Ok(Staged::owned(Buffer::from_vec(copy, target)))
    }
}

impl<T> Deref for Buffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for Buffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

/// Reserves exactly `len` slots, surfacing allocation failure as a status.
pub(crate) fn try_vec_with_capacity<T>(len: usize) -> GraphResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| GraphError::allocation::<T>(len))?;
    Ok(v)
}

/// Fallible `vec![value; len]`.
pub(crate) fn try_filled_vec<T: Clone>(len: usize, value: T) -> GraphResult<Vec<T>> {
    let mut v = try_vec_with_capacity(len)?;
    v.resize(len, value);
    Ok(v)
}

fn copy_of<T: Clone>(data: &[T]) -> GraphResult<Vec<T>> {
    let mut v = try_vec_with_capacity(data.len())?;
    v.extend_from_slice(data);
    Ok(v)
}

#[cfg(test)]
mod tests;
