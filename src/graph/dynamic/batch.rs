//! Batch records.

use serde::{Deserialize, Serialize};

use crate::graph::{GraphIndex, Weight};

/// One edge of a mutation batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge<V, W> {
    /// Source vertex.
    pub source: V,
    /// Destination vertex.
    pub destination: V,
    /// Weight stored on insert; ignored by deletes.
    pub weight: W,
}

impl<V: GraphIndex, W: Weight> Edge<V, W> {
    /// An edge carrying the default weight.
    pub fn new(source: V, destination: V) -> Self {
        Self::weighted(source, destination, W::default())
    }

    /// An edge carrying `weight`.
    pub fn weighted(source: V, destination: V, weight: W) -> Self {
        Self {
            source,
            destination,
            weight,
        }
    }

    /// The same edge with endpoints swapped.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            source: self.destination,
            destination: self.source,
            weight: self.weight,
        }
    }
}

/// What a completed batch did.
///
/// `submitted` counts logical edge operations, so an undirected insert of `k`
/// pairs submits `2k`. `applied + unchanged == submitted`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Edge operations in the batch.
    pub submitted: usize,
    /// Operations that changed the graph.
    pub applied: usize,
    /// Inserts of present edges and deletes of absent ones.
    pub unchanged: usize,
}

impl BatchSummary {
    pub(crate) fn new(submitted: usize, applied: usize) -> Self {
        Self {
            submitted,
            applied,
            unchanged: submitted - applied,
        }
    }
}
