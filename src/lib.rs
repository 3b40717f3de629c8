//! # `slabgraph` - Graph storage for massively parallel execution
//!
//! Represents one logical graph in several physical layouts, converts between
//! them, and keeps a mutable slab-hashed layout that absorbs high-throughput
//! batched edge edits without a full rebuild.
//!
//! ## Components
//!
//! 1. **Prefix scan** ([`concurrency::scan`]): blocked inclusive/exclusive scans
//!    and reductions. Every per-vertex count becomes an offset table through it.
//! 2. **Static formats** ([`CsrView`], [`CscView`], [`CooView`]): self-contained
//!    adjacency encodings answering the same [`GraphView`] queries.
//! 3. **Composite graph** ([`CompositeGraph`]): a fixed set of materialized
//!    formats behind one interface, dispatching to the primary view.
//! 4. **Dynamic graph** ([`DynamicGraph`]): per-vertex lock-free slabs with
//!    batched insert/delete and bulk conversion to and from CSR.
//!
//! ## Concurrency contract
//!
//! A dynamic graph is branded by a [`GraphToken`]. Queries borrow the token
//! shared, batches borrow it exclusively. Within a batch every edge runs in
//! parallel; edits to the same vertex serialize through compare-and-swap slot
//! claims on that vertex's slab.
//!
//! ## Example
//!
//! ```rust
//! use slabgraph::{
//!     Buffer, CsrView, DynamicGraph, DynamicGraphConfig, Edge, GraphProperties, GraphToken,
//! };
//!
//! let csr = CsrView::<u32, u32, f32>::new(vec![0, 2, 3, 3], vec![1, 2, 2], None);
//!
//! GraphToken::new(|mut token| {
//!     let props = GraphProperties::directed();
//!     let graph = DynamicGraph::from_csr(&token, &csr, props, DynamicGraphConfig::default())
//!         .unwrap();
//!
//!     let batch = Buffer::device(vec![Edge::new(2, 0)]);
//!     graph.insert_edges_batch(&mut token, &batch, 1, true).unwrap();
//!
//!     let exported: CsrView<u32, u32, f32> = graph.to_csr(&token).unwrap();
//!     assert_eq!(exported.neighbors(2), &[0]);
//!     graph.release(&mut token);
//! });
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

#[macro_use]
mod macros;

pub mod concurrency;
pub mod error;
pub mod graph;
pub mod memory;
pub mod token;

pub use concurrency::{Executor, LaunchConfig, ScanMode};
pub use error::{GraphError, GraphResult};
pub use graph::{
    average_degree, degree_histogram, degree_standard_deviation, BatchSummary, CompositeGraph,
    CooView, CscView, CsrView, DynamicGraph, DynamicGraphConfig, Edge, FormatKind, FormatView, GraphBase,
    GraphIndex, GraphProperties, GraphView, Representation, SlabConfig, SlabStats, Weight,
};
pub use memory::{Buffer, Residency};
pub use token::{GraphToken, SharedGraphToken};

const _: () = {
    use core::mem;

    // Tokens are ZSTs.
    assert!(mem::size_of::<GraphToken<'static>>() == 0);
    // Slab slots are single 64-bit words so claims are one CAS.
    assert!(mem::size_of::<core::sync::atomic::AtomicU64>() == 8);
};
