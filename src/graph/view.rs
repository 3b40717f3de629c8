//! The query surface shared by every graph layout.

use crate::graph::{GraphIndex, Weight};

/// Lookups every static layout answers, with per-layout complexity.
///
/// | Operation | CSR | CSC | COO |
/// |-----------|-----|-----|-----|
/// | `neighbor_list_length` | \(O(1)\) | \(O(1)\) | \(O(m)\) |
/// | `source_vertex` | \(O(\log n)\) | \(O(1)\) | \(O(1)\) |
/// | `destination_vertex` | \(O(1)\) | \(O(\log n)\) | \(O(1)\) |
/// | `edge_id` | \(O(\text{deg})\) | \(O(\text{deg})\) | \(O(m)\) |
///
/// Ids outside `0..number_of_vertices()` / `0..number_of_edges()` are contract
/// violations and panic. An absent edge is a regular `None`.
pub trait GraphView {
    /// Vertex identifier type.
    type Vertex: GraphIndex;
    /// Edge identifier type.
    type Edge: GraphIndex;
    /// Edge weight type.
    type Value: Weight;

    /// Vertex count.
    fn number_of_vertices(&self) -> usize;

    /// Edge count.
    fn number_of_edges(&self) -> usize;

    /// Length of the neighbor list this layout stores for `v`.
    ///
    /// Out-degree for CSR and COO, in-degree for CSC.
    fn neighbor_list_length(&self, v: Self::Vertex) -> Self::Edge;

    /// Source endpoint of edge `e`.
    fn source_vertex(&self, e: Self::Edge) -> Self::Vertex;

    /// Destination endpoint of edge `e`.
    fn destination_vertex(&self, e: Self::Edge) -> Self::Vertex;

    /// Both endpoints of edge `e`.
    fn source_and_destination(&self, e: Self::Edge) -> (Self::Vertex, Self::Vertex) {
        (self.source_vertex(e), self.destination_vertex(e))
    }

    /// Id of the edge `source -> destination`, the lowest one if there are parallel edges.
    fn edge_id(&self, source: Self::Vertex, destination: Self::Vertex) -> Option<Self::Edge>;

    /// Weight of edge `e`, or `None` when the layout stores no weights.
    fn edge_weight(&self, e: Self::Edge) -> Option<Self::Value>;
}
