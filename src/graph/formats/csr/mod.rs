//! A CSR (compressed sparse row) view.
//!
//! CSR is the interchange layout: the dynamic graph builds from it and exports
//! back to it, and the composite graph usually treats it as the primary view.
//!
//! Memory layout:
//! - `row_offsets`: `n + 1` offsets, `row_offsets[0] = 0`, `row_offsets[n] = m`
//! - `column_indices`: destination vertex of every edge slot
//! - `weights`: optional, one per edge slot

use crate::concurrency::Executor;
use crate::error::GraphResult;
use crate::graph::formats::compressed::Compressed;
use crate::graph::{CooView, CscView, GraphIndex, GraphView, Weight};
use crate::memory::{Buffer, Residency};

/// Row-compressed adjacency.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `neighbor_list_length` | \(O(1)\) | Out-degree from adjacent offsets |
/// | `source_vertex` | \(O(\log n)\) | Rightmost binary search over offsets |
/// | `destination_vertex` | \(O(1)\) | Direct index into `column_indices` |
/// | `edge_id` | \(O(\text{out-degree})\) | Linear scan of the source's row |
/// | `to_csc` | \(O(n + m)\) | Transpose |
#[derive(Debug, Clone, PartialEq)]
pub struct CsrView<V, E, W> {
    inner: Compressed<V, E, W>,
}

impl<V: GraphIndex, E: GraphIndex, W: Weight> CsrView<V, E, W> {
    /// Builds a device-resident CSR view from raw arrays.
    ///
    /// # Panics
    /// - if `row_offsets` is empty, does not start at 0, or is not monotone
    /// - if `row_offsets.last() != column_indices.len()`
    /// - if a column index is `>= n` or `weights` has the wrong length
    pub fn new(row_offsets: Vec<E>, column_indices: Vec<V>, weights: Option<Vec<W>>) -> Self {
        Self::from_buffers(
            Buffer::device(row_offsets),
            Buffer::device(column_indices),
            weights.map(Buffer::device),
        )
    }

    /// Builds a CSR view from residency-tagged buffers.
    ///
    /// # Panics
    /// Same conditions as [`CsrView::new`].
    pub fn from_buffers(row_offsets: Buffer<E>, column_indices: Buffer<V>, weights: Option<Buffer<W>>) -> Self {
        Self {
            inner: Compressed::new(row_offsets, column_indices, weights),
        }
    }

    /// Builds a CSR view from an adjacency list (unweighted).
    ///
    /// # Panics
    /// Panics if any neighbor is out of bounds.
    pub fn from_adjacency(adjacency: &[Vec<V>]) -> Self {
        let mut offsets = Vec::with_capacity(adjacency.len() + 1);
        offsets.push(E::zero());
        let mut total = 0usize;
        for nbrs in adjacency {
            total += nbrs.len();
            offsets.push(E::from_index(total));
        }
        let indices = adjacency.iter().flatten().copied().collect();
        Self::new(offsets, indices, None)
    }

    /// The `n + 1` row offsets.
    #[inline]
    pub fn row_offsets(&self) -> &[E] {
        self.inner.offsets()
    }

    /// Destination vertex of every edge slot.
    #[inline]
    pub fn column_indices(&self) -> &[V] {
        self.inner.indices()
    }

    /// Edge weights, if stored.
    #[inline]
    pub fn weights(&self) -> Option<&[W]> {
        self.inner.weights().map(|w| w.as_slice())
    }

    /// Out-neighbors of `v`.
    #[inline]
    pub fn neighbors(&self, v: V) -> &[V] {
        self.inner.slice(v)
    }

    /// Weights of the out-edges of `v`, aligned with [`CsrView::neighbors`].
    #[inline]
    pub fn neighbor_weights(&self, v: V) -> Option<&[W]> {
        self.inner.weight_slice(v)
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

    /// Builds the CSC layout of the same graph.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if scratch
    /// or output arrays cannot be reserved.
    pub fn to_csc(&self, exec: &Executor) -> GraphResult<CscView<V, E, W>> {
        Ok(CscView::from_compressed(self.inner.transpose(exec)?))
    }

    /// Builds the COO layout of the same graph, sorted by row.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if the
    /// row array cannot be reserved.
    pub fn to_coo(&self, exec: &Executor) -> GraphResult<CooView<V, E, W>> {
        let rows = exec.map(self.number_of_edges(), |e| self.inner.owner(E::from_index(e)))?;
        let residency = self.residency();
        Ok(CooView::from_buffers(
            self.number_of_vertices(),
            Buffer::from_vec(rows, residency),
            self.inner.indices().clone(),
            self.inner.weights().cloned(),
        ))
    }

    /// Splits the view into `(row_offsets, column_indices, weights)`.
    pub fn into_parts(self) -> (Vec<E>, Vec<V>, Option<Vec<W>>) {
        self.inner.into_parts()
    }

    pub(crate) fn offsets_buffer(&self) -> &Buffer<E> {
        self.inner.offsets()
    }

    pub(crate) fn indices_buffer(&self) -> &Buffer<V> {
        self.inner.indices()
    }

    pub(crate) fn weights_buffer(&self) -> Option<&Buffer<W>> {
        self.inner.weights()
    }

    pub(crate) fn from_compressed(inner: Compressed<V, E, W>) -> Self {
        Self { inner }
    }
}

impl<V: GraphIndex, E: GraphIndex, W: Weight> GraphView for CsrView<V, E, W> {
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
        self.inner.owner(e)
    }

    #[inline]
    fn destination_vertex(&self, e: E) -> V {
        self.inner.index_at(e)
    }

    fn edge_id(&self, source: V, destination: V) -> Option<E> {
        self.inner.find(source, destination)
    }

    fn edge_weight(&self, e: E) -> Option<W> {
        self.inner.weight(e)
    }
}

#[cfg(test)]
mod tests;
