//! Static adjacency layouts and the sum type that unifies them.
//!
//! - `csr`: row-compressed, out-edges contiguous per source
//! - `csc`: column-compressed, in-edges contiguous per destination
//! - `coo`: coordinate list, the interchange layout

mod compressed;
pub mod coo;
pub mod csc;
pub mod csr;

pub use coo::CooView;
pub use csc::CscView;
pub use csr::CsrView;

pub(crate) use compressed::count_by;

use serde::{Deserialize, Serialize};

use crate::concurrency::Executor;
use crate::error::GraphResult;
use crate::graph::{GraphIndex, GraphView, Weight};


/// Identifies one of the static layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatKind {
    /// Row-compressed.
    Csr,
    /// Column-compressed.
    Csc,
    /// Coordinate list.
    Coo,
}

/// One materialized layout. Queries dispatch by `match`.
#[derive(Debug, Clone, PartialEq)]
pub enum Representation<V, E, W> {
    /// Row-compressed view.
    Csr(CsrView<V, E, W>),
    /// Column-compressed view.
    Csc(CscView<V, E, W>),
    /// Coordinate view.
    Coo(CooView<V, E, W>),
}

macro_rules! dispatch {
    ($self:ident, $view:ident => $body:expr) => {
        match $self {
            Representation::Csr($view) => $body,
            Representation::Csc($view) => $body,
            Representation::Coo($view) => $body,
        }
    };
}

impl<V: GraphIndex, E: GraphIndex, W: Weight> Representation<V, E, W> {
    /// Which layout this is.
    pub fn kind(&self) -> FormatKind {
        match self {
            Self::Csr(_) => FormatKind::Csr,
            Self::Csc(_) => FormatKind::Csc,
            Self::Coo(_) => FormatKind::Coo,
        }
    }

    /// Converts this layout into `kind`. Cloning when `kind` already matches.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if a
    /// conversion buffer cannot be reserved.
    pub fn convert(&self, kind: FormatKind, exec: &Executor) -> GraphResult<Self> {
        if self.kind() == kind {
            return Ok(self.clone());
        }
        let csr = match self {
            Self::Csr(csr) => csr.clone(),
            Self::Csc(csc) => csc.to_csr(exec)?,
            Self::Coo(coo) => coo.to_csr(exec)?,
        };
        Ok(match kind {
            FormatKind::Csr => Self::Csr(csr),
            FormatKind::Csc => Self::Csc(csr.to_csc(exec)?),
            FormatKind::Coo => Self::Coo(csr.to_coo(exec)?),
        })
    }
}

impl<V: GraphIndex, E: GraphIndex, W: Weight> GraphView for Representation<V, E, W> {
    type Vertex = V;
    type Edge = E;
    type Value = W;

    fn number_of_vertices(&self) -> usize {
        dispatch!(self, view => view.number_of_vertices())
    }

    fn number_of_edges(&self) -> usize {
        dispatch!(self, view => view.number_of_edges())
    }

    fn neighbor_list_length(&self, v: V) -> E {
        dispatch!(self, view => view.neighbor_list_length(v))
    }

    fn source_vertex(&self, e: E) -> V {
        dispatch!(self, view => view.source_vertex(e))
    }

    fn destination_vertex(&self, e: E) -> V {
        dispatch!(self, view => view.destination_vertex(e))
    }

    fn edge_id(&self, source: V, destination: V) -> Option<E> {
        dispatch!(self, view => view.edge_id(source, destination))
    }

    fn edge_weight(&self, e: E) -> Option<W> {
        dispatch!(self, view => view.edge_weight(e))
    }
}

/// A concrete layout that can live inside a [`Representation`].
///
/// Lets callers ask for a layout by type, e.g. `graph.representation::<CsrView<_, _, _>>()`.
pub trait FormatView<V, E, W>: GraphView<Vertex = V, Edge = E, Value = W> + Sized {
    /// Tag of this layout.
    const KIND: FormatKind;

    /// Borrows the layout out of `repr` if it is this kind.
    fn from_representation(repr: &Representation<V, E, W>) -> Option<&Self>;

    /// Wraps the layout.
    fn into_representation(self) -> Representation<V, E, W>;
}

macro_rules! impl_format_view {
    ($view:ident, $variant:ident) => {
        impl<V: GraphIndex, E: GraphIndex, W: Weight> FormatView<V, E, W> for $view<V, E, W> {
            const KIND: FormatKind = FormatKind::$variant;

            #[inline]
            fn from_representation(repr: &Representation<V, E, W>) -> Option<&Self> {
                match repr {
                    Representation::$variant(view) => Some(view),
                    _ => None,
                }
            }

            #[inline]
            fn into_representation(self) -> Representation<V, E, W> {
                Representation::$variant(self)
            }
        }

        impl<V: GraphIndex, E: GraphIndex, W: Weight> From<$view<V, E, W>> for Representation<V, E, W> {
            fn from(view: $view<V, E, W>) -> Self {
                Representation::$variant(view)
            }
        }
    };
}

impl_format_view!(CsrView, Csr);
impl_format_view!(CscView, Csc);
impl_format_view!(CooView, Coo);
