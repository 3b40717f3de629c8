//! Graph-wide properties and dimensions.

use serde::{Deserialize, Serialize};

/// Structural flags attached to a graph once, at construction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphProperties {
    /// Edges have an orientation.
    pub directed: bool,
    /// Edges carry weights.
    pub weighted: bool,
}

impl GraphProperties {
    /// Directed, unweighted.
    pub const fn directed() -> Self {
        Self {
            directed: true,
            weighted: false,
        }
    }

    /// Undirected, unweighted.
    pub const fn undirected() -> Self {
        Self {
            directed: false,
            weighted: false,
        }
    }

    /// Same flags with `weighted` set.
    #[must_use]
    pub const fn with_weights(mut self) -> Self {
        self.weighted = true;
        self
    }
}

/// Dimensions and properties of a graph. Changes only at construction or bulk load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphBase {
    number_of_vertices: usize,
    number_of_edges: usize,
    properties: GraphProperties,
}

impl GraphBase {
    /// Creates the base record.
    pub const fn new(number_of_vertices: usize, number_of_edges: usize, properties: GraphProperties) -> Self {
        Self {
            number_of_vertices,
            number_of_edges,
            properties,
        }
    }

    /// Vertex count.
    #[inline]
    pub const fn number_of_vertices(&self) -> usize {
        self.number_of_vertices
    }

    /// Edge count.
    #[inline]
    pub const fn number_of_edges(&self) -> usize {
        self.number_of_edges
    }

    /// Attached properties.
    #[inline]
    pub const fn properties(&self) -> GraphProperties {
        self.properties
    }

    /// Whether edges are oriented.
    #[inline]
    pub const fn is_directed(&self) -> bool {
        self.properties.directed
    }

    /// Whether edges carry weights.
    #[inline]
    pub const fn is_weighted(&self) -> bool {
        self.properties.weighted
    }
}
