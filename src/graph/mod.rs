//! Graph layouts, the composite static graph, and the concurrent dynamic graph.
//!
//! - `formats`: static CSR / CSC / COO views behind [`GraphView`]
//! - `composite`: several materialized formats dispatching to a primary view
//! - `dynamic`: per-vertex slab hashing with batched mutation
//! - `stats`: degree statistics over any [`GraphView`]

pub mod composite;
pub mod dynamic;
pub mod formats;
mod properties;
mod stats;
mod types;
mod view;

pub use composite::CompositeGraph;
pub use dynamic::{BatchSummary, DynamicGraph, DynamicGraphConfig, Edge, SlabConfig, SlabStats};
pub use formats::{CooView, CscView, CsrView, FormatKind, FormatView, Representation};
pub use properties::{GraphBase, GraphProperties};
pub use stats::{average_degree, degree_histogram, degree_standard_deviation};
pub use types::{GraphIndex, Weight};
pub use view::GraphView;
