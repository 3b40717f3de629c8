//! Scoped staging guard.

use core::ops::Deref;

use super::{Buffer, Residency};

/// Data made available in a requested residency for one scope.
///
/// Either a borrow of the caller's buffer (already resident) or a staged copy
/// owned by the guard. The copy is released on drop, leaving the caller's buffer
/// exactly as it was.
pub struct Staged<'a, T> {
    inner: Inner<'a, T>,
}

enum Inner<'a, T> {
    Borrowed(&'a [T], Residency),
    Owned(Buffer<T>),
}

impl<'a, T> Staged<'a, T> {
    pub(super) fn borrowed(data: &'a [T], residency: Residency) -> Self {
        Self {
            inner: Inner::Borrowed(data, residency),
        }
    }

    pub(super) fn owned(buffer: Buffer<T>) -> Self {
        Self {
            inner: Inner::Owned(buffer),
        }
    }

    /// Returns `true` if a staging copy was made.
    pub fn is_copy(&self) -> bool {
        matches!(self.inner, Inner::Owned(_))
    }

    /// Residency of the staged view.
    pub fn residency(&self) -> Residency {
        match &self.inner {
            Inner::Borrowed(_, residency) => *residency,
            Inner::Owned(buffer) => buffer.residency(),
        }
    }
}

impl<T> Deref for Staged<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match &self.inner {
            Inner::Borrowed(data, _) => data,
            Inner::Owned(buffer) => buffer.as_slice(),
        }
    }
}

#[cfg(feature = "tracing")]
impl<T> Drop for Staged<'_, T> {
    fn drop(&mut self) {
        if let Inner::Owned(buffer) = &self.inner {
            trace_event!(len = buffer.len(), "staged copy released");
        }
    }
}
