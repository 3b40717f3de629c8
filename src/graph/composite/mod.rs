//! A static graph holding several materialized layouts at once.
//!
//! Generic queries go to the primary (first) representation. Algorithms that
//! want a specific access pattern check for it with
//! [`CompositeGraph::has_representation`] and borrow it with
//! [`CompositeGraph::representation`].

use crate::concurrency::Executor;
use crate::error::GraphResult;
use crate::graph::{
    average_degree, degree_histogram, degree_standard_deviation, CsrView, FormatKind, FormatView,
    GraphBase, GraphIndex, GraphProperties, GraphView, Representation, Weight,
};
use crate::memory::Residency;

/// One logical graph, several physical layouts, a single shared [`GraphBase`].
///
/// The edge data is fixed at construction. [`CompositeGraph::with_format`] may
/// add layouts later, but only ones derived from the primary view, so every
/// layout always describes the same edges and the base never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeGraph<V, E, W> {
    base: GraphBase,
    views: Vec<Representation<V, E, W>>,
}

impl<V: GraphIndex, E: GraphIndex, W: Weight> CompositeGraph<V, E, W> {
    /// Builds a CSR-primary graph from raw row-compressed arrays.
    ///
    /// # Panics
    /// - if `num_rows != num_cols` (adjacency matrices are square)
    /// - if `offsets.len() != num_rows + 1` or `indices.len() != num_nonzeros`
    /// - if the arrays violate the CSR invariants
    pub fn from_csr(
        properties: GraphProperties,
        num_rows: usize,
        num_cols: usize,
        num_nonzeros: usize,
        offsets: Vec<E>,
        indices: Vec<V>,
        weights: Option<Vec<W>>,
    ) -> Self {
        assert!(
            num_rows == num_cols,
            "adjacency must be square, got {num_rows}x{num_cols}"
        );
        assert!(
            offsets.len() == num_rows + 1,
            "expected {} offsets, got {}",
            num_rows + 1,
            offsets.len()
        );
        assert!(
            indices.len() == num_nonzeros,
            "expected {num_nonzeros} indices, got {}",
            indices.len()
        );
        let csr = CsrView::new(offsets, indices, weights);
        Self::from_views(properties, vec![Representation::Csr(csr)])
    }

    /// Builds a graph over already constructed views. The first one is primary.
    ///
    /// # Panics
    /// Panics if the views disagree on vertex or edge counts, or if two views
    /// share a layout.
    pub fn from_views(properties: GraphProperties, views: Vec<Representation<V, E, W>>) -> Self {
        let (n, m) = views
            .first()
            .map_or((0, 0), |v| (v.number_of_vertices(), v.number_of_edges()));
        for (i, view) in views.iter().enumerate() {
            assert!(
                view.number_of_vertices() == n && view.number_of_edges() == m,
                "view {i} ({:?}) has {}x{} but the primary has {n}x{m}",
                view.kind(),
                view.number_of_vertices(),
                view.number_of_edges()
            );
            assert!(
                views[..i].iter().all(|other| other.kind() != view.kind()),
                "layout {:?} listed twice",
                view.kind()
            );
        }
        Self {
            base: GraphBase::new(n, m, properties),
            views,
        }
    }

    /// Materializes `kind` from the primary view if it is not present yet.
    ///
    /// The new layout is a conversion of the primary, never new data; the
    /// primary itself and [`CompositeGraph::base`] stay as they are.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if the
    /// conversion cannot reserve its buffers.
    pub fn with_format(&mut self, kind: FormatKind, exec: &Executor) -> GraphResult<()> {
        if self.views.iter().any(|v| v.kind() == kind) {
            return Ok(());
        }
        let view = self.primary().convert(kind, exec)?;
        debug_event!(kind = ?kind, edges = self.base.number_of_edges(), "representation materialized");
        self.views.push(view);
        Ok(())
    }

    /// The shared dimensions and properties.
    #[inline]
    pub fn base(&self) -> &GraphBase {
        &self.base
    }

    /// Attached properties.
    #[inline]
    pub fn properties(&self) -> GraphProperties {
        self.base.properties()
    }

    /// Whether edges are oriented.
    #[inline]
    pub fn is_directed(&self) -> bool {
        self.base.is_directed()
    }

    /// The view generic queries dispatch to.
    ///
    /// # Panics
    /// Panics if the graph holds no views.
    #[inline]
    pub fn primary(&self) -> &Representation<V, E, W> {
        self.views
            .first()
            .unwrap_or_else(|| panic!("composite graph holds no representation"))
    }

    /// Every materialized view, primary first.
    pub fn representations(&self) -> &[Representation<V, E, W>] {
        &self.views
    }

    /// Number of materialized views.
    pub fn number_of_graph_representations(&self) -> usize {
        self.views.len()
    }

    /// Whether layout `T` is materialized.
    pub fn has_representation<T: FormatView<V, E, W>>(&self) -> bool {
        self.views.iter().any(|v| v.kind() == T::KIND)
    }

    /// Borrows layout `T`, if materialized.
    pub fn representation<T: FormatView<V, E, W>>(&self) -> Option<&T> {
        self.views.iter().find_map(T::from_representation)
    }

    /// Moves every view to `target`.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if a copy fails.
    pub fn move_to(&mut self, target: Residency) -> GraphResult<()> {
        for view in &mut self.views {
            match view {
                Representation::Csr(csr) => csr.move_to(target)?,
                Representation::Csc(csc) => csc.move_to(target)?,
                Representation::Coo(coo) => coo.move_to(target)?,
            }
        }
        Ok(())
    }

    /// Mean neighbor-list length over the primary view; `0.0` for an empty graph.
    pub fn average_degree(&self) -> f64 {
        average_degree(self)
    }

    /// Population standard deviation of the neighbor-list lengths.
    pub fn degree_standard_deviation(&self) -> f64 {
        degree_standard_deviation(self)
    }

    /// Log-scale degree histogram, see [`degree_histogram`].
    pub fn degree_histogram(&self) -> GraphResult<Vec<usize>> {
        degree_histogram(self)
    }
}

impl<V: GraphIndex, E: GraphIndex, W: Weight> GraphView for CompositeGraph<V, E, W> {
    type Vertex = V;
    type Edge = E;
    type Value = W;

    #[inline]
    fn number_of_vertices(&self) -> usize {
        self.base.number_of_vertices()
    }

    #[inline]
    fn number_of_edges(&self) -> usize {
        self.base.number_of_edges()
    }

    #[inline]
    fn neighbor_list_length(&self, v: V) -> E {
        self.primary().neighbor_list_length(v)
    }

    #[inline]
    fn source_vertex(&self, e: E) -> V {
        self.primary().source_vertex(e)
    }

    #[inline]
    fn destination_vertex(&self, e: E) -> V {
        self.primary().destination_vertex(e)
    }

    fn edge_id(&self, source: V, destination: V) -> Option<E> {
        self.primary().edge_id(source, destination)
    }

    fn edge_weight(&self, e: E) -> Option<W> {
        self.primary().edge_weight(e)
    }
}
