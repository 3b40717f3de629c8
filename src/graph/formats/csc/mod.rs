//! A CSC (compressed sparse column) view.
//!
//! CSC is the column-major mirror of CSR: offsets are indexed by destination,
//! so incoming edges of a vertex are contiguous.
//!
//! Memory layout:
//! - `column_offsets`: `n + 1` offsets indexed by destination vertex
//! - `row_indices`: source vertex of every edge slot
//! - `weights`: optional, one per edge slot

use crate::concurrency::Executor;
use crate::error::GraphResult;
use crate::graph::formats::compressed::Compressed;
use crate::graph::{CsrView, GraphIndex, GraphView, Weight};
use crate::memory::{Buffer, Residency};

/// Column-compressed adjacency.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `neighbor_list_length` | \(O(1)\) | In-degree from adjacent offsets |
/// | `source_vertex` | \(O(1)\) | Direct index into `row_indices` |
/// | `destination_vertex` | \(O(\log n)\) | Rightmost binary search over offsets |
/// | `edge_id` | \(O(\text{in-degree})\) | Linear scan of the destination's column |
/// | `to_csr` | \(O(n + m)\) | Transpose |
#[derive(Debug, Clone, PartialEq)]
pub struct CscView<V, E, W> {
    inner: Compressed<V, E, W>,
}

impl<V: GraphIndex, E: GraphIndex, W: Weight> CscView<V, E, W> {
    /// Builds a device-resident CSC view from raw arrays.
    ///
    /// # Panics
    /// - if `column_offsets` is empty, does not start at 0, or is not monotone
    /// - if `column_offsets.last() != row_indices.len()`
    /// - if a row index is `>= n` or `weights` has the wrong length
    pub fn new(column_offsets: Vec<E>, row_indices: Vec<V>, weights: Option<Vec<W>>) -> Self {
        Self::from_buffers(
            Buffer::device(column_offsets),
            Buffer::device(row_indices),
            weights.map(Buffer::device),
        )
    }

    /// Builds a CSC view from residency-tagged buffers.
    ///
    /// # Panics
    /// Same conditions as [`CscView::new`].
    pub fn from_buffers(column_offsets: Buffer<E>, row_indices: Buffer<V>, weights: Option<Buffer<W>>) -> Self {
        Self {
            inner: Compressed::new(column_offsets, row_indices, weights),
        }
    }

    /// The `n + 1` column offsets.
    #[inline]
    pub fn column_offsets(&self) -> &[E] {
        self.inner.offsets()
    }

    /// Source vertex of every edge slot.
    #[inline]
    pub fn row_indices(&self) -> &[V] {
        self.inner.indices()
    }

    /// Edge weights, if stored.
    #[inline]
    pub fn weights(&self) -> Option<&[W]> {
        self.inner.weights().map(|w| w.as_slice())
    }

    /// In-neighbors of `v` (every `u` with `u -> v`).
    #[inline]
    pub fn in_neighbors(&self, v: V) -> &[V] {
        self.inner.slice(v)
    }

    /// Residency of the arrays.
    pub fn residency(&self) -> Residency {
        self.inner.residency()
    }

    /// Moves every array to `target`.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if a copy fails.
    pub fn move_to(&mut self, target: Residency) -> GraphResult<()> {
        self.inner.move_to(target)
    }

    /// Builds the CSR layout of the same graph.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if scratch
    /// or output arrays cannot be reserved.
    pub fn to_csr(&self, exec: &Executor) -> GraphResult<CsrView<V, E, W>> {
        Ok(CsrView::from_compressed(self.inner.transpose(exec)?))
    }

    /// Splits the view into `(column_offsets, row_indices, weights)`.
    pub fn into_parts(self) -> (Vec<E>, Vec<V>, Option<Vec<W>>) {
        self.inner.into_parts()
    }

    pub(crate) fn from_compressed(inner: Compressed<V, E, W>) -> Self {
        Self { inner }
    }
}

impl<V: GraphIndex, E: GraphIndex, W: Weight> GraphView for CscView<V, E, W> {
    type Vertex = V;
    type Edge = E;
    type Value = W;

    #[inline]
    fn number_of_vertices(&self) -> usize {
        self.inner.number_of_vertices()
    }

    #[inline]
    fn number_of_edges(&self) -> usize {
        self.inner.number_of_edges()
    }

    #[inline]
    fn neighbor_list_length(&self, v: V) -> E {
        self.inner.length(v)
    }

    #[inline]
    fn source_vertex(&self, e: E) -> V {
        self.inner.index_at(e)
    }

    #[inline]
    fn destination_vertex(&self, e: E) -> V {
        self.inner.owner(e)
    }

    fn edge_id(&self, source: V, destination: V) -> Option<E> {
        self.inner.find(destination, source)
    }

    fn edge_weight(&self, e: E) -> Option<W> {
        self.inner.weight(e)
    }
}
