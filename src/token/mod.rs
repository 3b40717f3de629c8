//! `GraphToken` - the write capability for branded dynamic graphs.
//!
//! A `DynamicGraph<'brand, ..>` is tied to exactly one token scope. Queries take
//! `&GraphToken<'brand>` and batch mutations take `&mut GraphToken<'brand>`, so
//! the borrow checker rules out a second writer and any reader overlapping a
//! running batch, while the graph itself can still be shared by reference.
//!
//! ## Core invariant (linearity)
//!
//! `GraphToken<'brand>` is intentionally **not** `Copy`/`Clone`. Two live
//! `&mut GraphToken<'brand>` cannot coexist, so at most one mutation batch per
//! brand is in flight at any time.

/// Shared tokens for several controlling threads.
pub mod shared;

pub use shared::SharedGraphToken;

use core::marker::PhantomData;

/// Invariant lifetime marker used for branding.
///
/// `fn(&'brand ()) -> &'brand ()` is invariant in `'brand`, so brands created by
/// two separate `GraphToken::new` calls can never unify.
pub(crate) type InvariantBrand<'brand> = PhantomData<fn(&'brand ()) -> &'brand ()>;

/// A zero-sized capability that gates access to branded graphs.
#[derive(Debug)]
pub struct GraphToken<'brand>(InvariantBrand<'brand>);

impl<'brand> GraphToken<'brand> {
    /// Creates a fresh brand and runs `f` with its token.
    ///
    /// # Example
    ///
    /// ```rust
    /// use slabgraph::{DynamicGraph, DynamicGraphConfig, GraphProperties, GraphToken};
    ///
    /// let degree = GraphToken::new(|token| {
    ///     let graph = DynamicGraph::<u32, f32>::new(
    ///         &token,
    ///         4,
    ///         GraphProperties::default(),
    ///         DynamicGraphConfig::default(),
    ///     )
    ///     .unwrap();
    ///     graph.neighbor_list_length(&token, 0)
    /// });
    /// assert_eq!(degree, 0);
    /// ```
    pub fn new<F, R>(f: F) -> R
    where
        F: for<'new_brand> FnOnce(GraphToken<'new_brand>) -> R,
    {
        f(GraphToken(PhantomData))
    }

    /// Returns a reference to the token (useful for capturing in closures).
    #[inline(always)]
    pub const fn as_ref(&self) -> &Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn token_is_zero_sized_and_shareable() {
        assert_eq!(core::mem::size_of::<GraphToken<'static>>(), 0);
        assert_send_sync::<GraphToken<'static>>();
    }

    #[test]
    fn new_returns_closure_result() {
        let out = GraphToken::new(|token| {
            let _ = token.as_ref();
            7
        });
        assert_eq!(out, 7);
    }
}
