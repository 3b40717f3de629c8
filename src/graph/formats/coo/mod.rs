//! A COO (coordinate list) view.
//!
//! One `(row, column)` pair per edge with no offset table. Edge ids are array
//! positions, so `source_vertex` and `destination_vertex` are direct reads,
//! while per-vertex questions scan the whole edge list.

use core::marker::PhantomData;

use crate::concurrency::{offsets_from_counts, Executor};
use crate::error::GraphResult;
use crate::graph::formats::compressed::{count_by, Compressed};
use crate::graph::{CsrView, GraphIndex, GraphView, Weight};
use crate::memory::{try_filled_vec, try_vec_with_capacity, Buffer, Residency};

/// Coordinate-list adjacency.
///
/// `E` is the edge identifier type handed out by [`GraphView`]; it is not
/// stored, since an edge id is just a position in the arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct CooView<V, E, W> {
    number_of_vertices: usize,
    row_indices: Buffer<V>,
    column_indices: Buffer<V>,
    weights: Option<Buffer<W>>,
    _edge: PhantomData<E>,
}

impl<V: GraphIndex, E: GraphIndex, W: Weight> CooView<V, E, W> {
    /// Builds a device-resident COO view over `number_of_vertices` vertices.
    ///
    /// # Panics
    /// - if `row_indices` and `column_indices` differ in length
    /// - if any endpoint is `>= number_of_vertices`
    /// - if `weights` has the wrong length
    pub fn new(
        number_of_vertices: usize,
        row_indices: Vec<V>,
        column_indices: Vec<V>,
        weights: Option<Vec<W>>,
    ) -> Self {
        Self::from_buffers(
            number_of_vertices,
            Buffer::device(row_indices),
            Buffer::device(column_indices),
            weights.map(Buffer::device),
        )
    }

    /// Builds a COO view from residency-tagged buffers.
    ///
    /// # Panics
    /// Same conditions as [`CooView::new`].
    pub fn from_buffers(
        number_of_vertices: usize,
        row_indices: Buffer<V>,
        column_indices: Buffer<V>,
        weights: Option<Buffer<W>>,
    ) -> Self {
        let m = row_indices.len();
        assert!(
            column_indices.len() == m,
            "expected {m} column indices, got {}",
            column_indices.len()
        );
        for &v in row_indices.iter().chain(column_indices.iter()) {
            assert!(
                v.index() < number_of_vertices,
                "vertex {v:?} out of bounds for n={number_of_vertices}"
            );
        }
        if let Some(w) = &weights {
            assert!(w.len() == m, "expected {m} weights, got {}", w.len());
        }
        Self {
            number_of_vertices,
            row_indices,
            column_indices,
            weights,
            _edge: PhantomData,
        }
    }

    /// Source vertex of every edge.
    #[inline]
    pub fn row_indices(&self) -> &[V] {
        &self.row_indices
    }

    /// Destination vertex of every edge.
    #[inline]
    pub fn column_indices(&self) -> &[V] {
        &self.column_indices
    }

    /// Edge weights, if stored.
    #[inline]
    pub fn weights(&self) -> Option<&[W]> {
        self.weights.as_ref().map(|w| w.as_slice())
    }

    /// Residency of the arrays.
    pub fn residency(&self) -> Residency {
        self.row_indices.residency()
    }

    /// Moves every array to `target`.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if a copy fails.
    pub fn move_to(&mut self, target: Residency) -> GraphResult<()> {
        self.row_indices.move_to(target)?;
        self.column_indices.move_to(target)?;
        if let Some(w) = &mut self.weights {
            w.move_to(target)?;
        }
        Ok(())
    }

    /// Builds the CSR layout of the same graph.
    ///
    /// Edges keep their relative order within each row.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if scratch
    /// or output arrays cannot be reserved.
    pub fn to_csr(&self, exec: &Executor) -> GraphResult<CsrView<V, E, W>> {
        let n = self.number_of_vertices;
        let m = self.row_indices.len();

        let counts = count_by(exec, n, m, |e| self.row_indices[e].index())?;
        let offsets: Vec<E> = offsets_from_counts(exec, &counts)?;

        let mut cursor: Vec<usize> = try_vec_with_capacity(n)?;
        cursor.extend(offsets[..n].iter().map(|o| o.index()));
        let mut columns = try_filled_vec(m, V::zero())?;
        let mut weights = match &self.weights {
            Some(_) => Some(try_filled_vec(m, W::default())?),
            None => None,
        };

        for e in 0..m {
            let row = self.row_indices[e].index();
            let slot = cursor[row];
            cursor[row] += 1;
            columns[slot] = self.column_indices[e];
            if let (Some(out), Some(src)) = (&mut weights, &self.weights) {
                out[slot] = src[e];
            }
        }

        let residency = self.residency();
        trace_event!(n, m, "coordinate list compressed by row");
        Ok(CsrView::from_compressed(Compressed::new(
            Buffer::from_vec(offsets, residency),
            Buffer::from_vec(columns, residency),
            weights.map(|w| Buffer::from_vec(w, residency)),
        )))
    }

    /// Splits the view into `(row_indices, column_indices, weights)`.
    pub fn into_parts(self) -> (Vec<V>, Vec<V>, Option<Vec<W>>) {
        (
            self.row_indices.into_vec(),
            self.column_indices.into_vec(),
            self.weights.map(Buffer::into_vec),
        )
    }

    fn check_vertex(&self, v: V) {
        assert!(
            v.index() < self.number_of_vertices,
            "vertex {v:?} out of bounds for n={}",
            self.number_of_vertices
        );
    }

    fn check_edge(&self, e: E) {
        assert!(
            e.index() < self.row_indices.len(),
            "edge {e:?} out of bounds for m={}",
            self.row_indices.len()
        );
    }
}

impl<V: GraphIndex, E: GraphIndex, W: Weight> GraphView for CooView<V, E, W> {
    type Vertex = V;
    type Edge = E;
    type Value = W;

    #[inline]
    fn number_of_vertices(&self) -> usize {
        self.number_of_vertices
    }

    #[inline]
    fn number_of_edges(&self) -> usize {
        self.row_indices.len()
    }

    fn neighbor_list_length(&self, v: V) -> E {
        self.check_vertex(v);
        E::from_index(self.row_indices.iter().filter(|&&r| r == v).count())
    }

    #[inline]
    fn source_vertex(&self, e: E) -> V {
        self.check_edge(e);
        self.row_indices[e.index()]
    }

    #[inline]
    fn destination_vertex(&self, e: E) -> V {
        self.check_edge(e);
        self.column_indices[e.index()]
    }

    fn edge_id(&self, source: V, destination: V) -> Option<E> {
        self.check_vertex(source);
        self.check_vertex(destination);
        self.row_indices
            .iter()
            .zip(self.column_indices.iter())
            .position(|(&r, &c)| r == source && c == destination)
            .map(E::from_index)
    }

    fn edge_weight(&self, e: E) -> Option<W> {
        self.check_edge(e);
        self.weights.as_ref().map(|w| w[e.index()])
    }
}
