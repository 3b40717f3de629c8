//! `DynamicGraph` - a concurrent, slab-hashed adjacency structure.
//!
//! Each vertex owns a [`slab`](self) of lock-free open-addressed blocks holding
//! its neighbor set. Batches run one edge per lane; lanes touching the same
//! vertex serialize through compare-and-swap slot claims on that vertex's slab,
//! lanes touching different vertices never interact.
//!
//! Lifecycle: `new` / `from_csr` -> any number of insert and delete batches
//! -> `to_csr` exports (read-only) -> `release`.
//!
//! The graph is branded by a [`GraphToken`]. Batches take the token mutably, so
//! no query or second batch can overlap a running one.

mod batch;
mod slab;

pub use batch::{BatchSummary, Edge};
pub use slab::SlabConfig;

use core::marker::PhantomData;
use core::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;
use serde::{Deserialize, Serialize};

use crate::concurrency::{offsets_from_counts, Executor, LaunchConfig};
use crate::error::GraphResult;
use crate::graph::{CsrView, GraphIndex, GraphProperties, Weight};
use crate::memory::{try_filled_vec, try_vec_with_capacity, Buffer, Residency};
use crate::token::{GraphToken, InvariantBrand};

use slab::{Outcome, VertexSlab, TOMBSTONE};

/// Construction parameters for a [`DynamicGraph`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicGraphConfig {
    /// Slab sizing policy.
    pub slab: SlabConfig,
    /// Launch parameters for batch and export kernels.
    pub launch: LaunchConfig,
}

/// Occupancy snapshot of every slab in a graph.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabStats {
    /// Vertex count.
    pub vertices: usize,
    /// Live neighbor entries.
    pub live: usize,
    /// Deleted entries still occupying slots.
    pub tombstones: usize,
    /// Allocated blocks across all chains.
    pub blocks: usize,
}

/// A mutable graph keyed per vertex, modified by parallel batches.
///
/// Neighbor sets are sets: an edge is present at most once, inserting a present
/// edge or deleting an absent one is a no-op.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `insert_edges_batch` | \(O(k)\) work | One lane per edge, CAS per slot claim |
/// | `delete_edges_batch` | \(O(k)\) work | Tombstones, plus \(O(\text{deg})\) per source slab it rebuilds |
/// | `neighbor_list_length` | \(O(1)\) | Live counter per slab |
/// | `to_csr` | \(O(n + m \log d)\) | Count, scan, scatter, per-row sort |
pub struct DynamicGraph<'brand, V, W> {
    slabs: Vec<VertexSlab>,
    edges: CachePadded<AtomicUsize>,
    properties: GraphProperties,
    config: DynamicGraphConfig,
    exec: Executor,
    _brand: InvariantBrand<'brand>,
    _types: PhantomData<fn() -> (V, W)>,
}

impl<'brand, V: GraphIndex, W: Weight> DynamicGraph<'brand, V, W> {
    /// Creates an empty graph over `number_of_vertices` vertices.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if the slab
    /// table cannot be reserved, or [`GraphError::Execution`](crate::GraphError::Execution)
    /// if a dedicated worker pool cannot start.
    ///
    /// # Panics
    /// Panics if `config.slab` is invalid.
    pub fn new(
        _token: &GraphToken<'brand>,
        number_of_vertices: usize,
        properties: GraphProperties,
        config: DynamicGraphConfig,
    ) -> GraphResult<Self> {
        let capacity = config.slab.min_block_capacity;
        Self::with_capacities(number_of_vertices, properties, config, |_| capacity)
    }

    /// Bulk-builds a graph holding exactly the edges of `csr`.
    ///
    /// Host-resident arrays are staged into device memory for the build and the
    /// staging copies are released before returning. Each vertex's slab is
    /// sized from its CSR degree. Duplicate CSR edges collapse into one entry
    /// keeping the first weight in row order.
    ///
    /// The graph is weighted exactly when `csr` stores weights; the `weighted`
    /// flag of `properties` is replaced accordingly, so [`DynamicGraph::to_csr`]
    /// hands the same weights back.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if staging
    /// or slab storage cannot be reserved.
    pub fn from_csr<E: GraphIndex>(
        _token: &GraphToken<'brand>,
        csr: &CsrView<V, E, W>,
        properties: GraphProperties,
        config: DynamicGraphConfig,
    ) -> GraphResult<Self> {
        let properties = GraphProperties {
            weighted: csr.weights_buffer().is_some(),
            ..properties
        };
        let offsets = csr.offsets_buffer().stage(Residency::Device)?;
        let indices = csr.indices_buffer().stage(Residency::Device)?;
        let weights = match csr.weights_buffer() {
            Some(w) => Some(w.stage(Residency::Device)?),
            None => None,
        };

        let n = offsets.len() - 1;
        let degree = |v: usize| offsets[v + 1].index() - offsets[v].index();
        let graph = Self::with_capacities(n, properties, config, |v| {
            config.slab.initial_capacity(degree(v))
        })?;

        let applied = AtomicUsize::new(0);
        let result = graph.exec.try_for_each(n, |v| {
            let slab = &graph.slabs[v];
            let mut added = 0;
            for e in offsets[v].index()..offsets[v + 1].index() {
                let value = weights.as_ref().map_or(0, |w| w[e].to_bits());
                if slab.insert(key_of(indices[e]), value)? == Outcome::Applied {
                    added += 1;
                }
            }
            applied.fetch_add(added, Ordering::Relaxed);
            Ok(())
        });
        graph.edges.store(applied.into_inner(), Ordering::Release);
        result?;

        debug_event!(
            vertices = n,
            csr_edges = indices.len(),
            edges = graph.edges.load(Ordering::Acquire),
            staged = offsets.is_copy(),
            "dynamic graph built from csr"
        );
        Ok(graph)
    }

    fn with_capacities<C>(
        number_of_vertices: usize,
        properties: GraphProperties,
        config: DynamicGraphConfig,
        capacity: C,
    ) -> GraphResult<Self>
    where
        C: Fn(usize) -> usize,
    {
        config.slab.validate();
        assert!(
            (number_of_vertices as u64) < TOMBSTONE,
            "vertex count {number_of_vertices} collides with slab sentinels"
        );
        let exec = Executor::new(config.launch)?;
        let mut slabs = try_vec_with_capacity(number_of_vertices)?;
        slabs.extend(
            (0..number_of_vertices).map(|v| VertexSlab::new(capacity(v), config.slab.growth_factor)),
        );
        Ok(Self {
            slabs,
            edges: CachePadded::new(AtomicUsize::new(0)),
            properties,
            config,
            exec,
            _brand: PhantomData,
            _types: PhantomData,
        })
    }

    /// Inserts the first `count` edges of `edges`.
    ///
    /// With `directed == false` every pair is inserted in both directions, so the
    /// batch is logically doubled. Present edges are left untouched, including
    /// their weight. Host-resident batches are staged and the copy released
    /// before returning; the caller's buffer is not modified.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if staging
    /// or a slab block cannot be reserved. Edges processed before the failure stay
    /// applied.
    ///
    /// # Panics
    /// Panics if `count > edges.len()` or an endpoint is out of range.
    pub fn insert_edges_batch(
        &self,
        _token: &mut GraphToken<'brand>,
        edges: &Buffer<Edge<V, W>>,
        count: usize,
        directed: bool,
    ) -> GraphResult<BatchSummary> {
        assert!(
            count <= edges.len(),
            "batch count {count} exceeds buffer length {}",
            edges.len()
        );
        let staged = edges.stage(Residency::Device)?;
        let batch = &staged[..count];
        let submitted = if directed { count } else { 2 * count };

        let applied = AtomicUsize::new(0);
        let result = self.exec.try_for_each(submitted, |i| {
            let edge = if i < count { batch[i] } else { batch[i - count].reversed() };
            let slab = self.slab(edge.source);
            self.check_vertex(edge.destination);
            if slab.insert(key_of(edge.destination), edge.weight.to_bits())? == Outcome::Applied {
                applied.fetch_add(1, Ordering::Relaxed);
            }
            Ok(())
        });
        let applied = applied.into_inner();
        self.edges.fetch_add(applied, Ordering::AcqRel);
        result?;

        debug_event!(submitted, applied, directed, staged = staged.is_copy(), "insert batch complete");
        Ok(BatchSummary::new(submitted, applied))
    }

    /// Deletes the first `count` edges of `edges`, exactly as given.
    ///
    /// Absent pairs are ignored. Staging follows [`DynamicGraph::insert_edges_batch`].
    /// Once every deletion has landed, each source slab left with more tombstones
    /// than live entries is rebuilt, so insert/delete churn keeps memory and probe
    /// length proportional to the live neighbor count.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if a
    /// host-resident batch or a rebuilt slab cannot be reserved. Deletions are
    /// applied either way.
    ///
    /// # Panics
    /// Panics if `count > edges.len()` or an endpoint is out of range.
    pub fn delete_edges_batch(
        &self,
        _token: &mut GraphToken<'brand>,
        edges: &Buffer<Edge<V, W>>,
        count: usize,
    ) -> GraphResult<BatchSummary> {
        assert!(
            count <= edges.len(),
            "batch count {count} exceeds buffer length {}",
            edges.len()
        );
        let staged = edges.stage(Residency::Device)?;
        let batch = &staged[..count];

        let applied = self.exec.map_reduce(
            count,
            0usize,
            |i| {
                let edge = batch[i];
                let slab = self.slab(edge.source);
                self.check_vertex(edge.destination);
                usize::from(slab.remove(key_of(edge.destination)) == Outcome::Applied)
            },
            |a, b| a + b,
        );
        self.edges.fetch_sub(applied, Ordering::AcqRel);

        let rebuilt = if applied == 0 { 0 } else { self.compact_sources(batch)? };

        debug_event!(
            submitted = count,
            applied,
            rebuilt,
            staged = staged.is_copy(),
            "delete batch complete"
        );
        Ok(BatchSummary::new(count, applied))
    }

    /// Rebuilds the tombstone-heavy slabs among the sources of `batch`.
    ///
    /// Only called from a batch holding the token mutably, after its parallel
    /// phase has finished.
    fn compact_sources(&self, batch: &[Edge<V, W>]) -> GraphResult<usize> {
        let mut dirty: Vec<usize> = try_vec_with_capacity(batch.len())?;
        dirty.extend(
            batch
                .iter()
                .map(|edge| edge.source.index())
                .filter(|&v| self.slabs[v].needs_compaction()),
        );
        dirty.sort_unstable();
        dirty.dedup();

        let slab_config = self.config.slab;
        self.exec.try_for_each(dirty.len(), |i| {
            // SAFETY: the caller holds the brand's token mutably, so no query or
            // batch can reach this graph, and `dirty` names each slab once.
            let rebuilt = unsafe { self.slabs[dirty[i]].compact_exclusive(&slab_config) };
            rebuilt.map(drop)
        })?;
        Ok(dirty.len())
    }

    /// Exports the current edges as a device-resident CSR.
    ///
    /// Counts live neighbors per vertex, scans the counts into row offsets, then
    /// scatters each vertex's neighbors into its row in parallel. Rows are sorted
    /// by neighbor id. Weights are exported when the graph is weighted.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if the
    /// export arrays or scratch space cannot be reserved.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_csr<E: GraphIndex>(&self, _token: &GraphToken<'brand>) -> GraphResult<CsrView<V, E, W>> {
        let n = self.slabs.len();
        let counts = self.exec.map(n, |v| self.slabs[v].len())?;
        let offsets: Vec<E> = offsets_from_counts(&self.exec, &counts)?;
        let m = offsets[n].index();

        let mut indices = try_filled_vec(m, V::zero())?;
        let mut weights = if self.properties.weighted {
            Some(try_filled_vec(m, W::default())?)
        } else {
            None
        };

        let mut rows: Vec<(&mut [V], Option<&mut [W]>)> = try_vec_with_capacity(n)?;
        let mut rest = indices.as_mut_slice();
        let mut rest_weights = weights.as_deref_mut();
        for &count in &counts {
            let (row, tail) = core::mem::take(&mut rest).split_at_mut(count);
            rest = tail;
            let row_weights = rest_weights.take().map(|w| {
                let (head, tail) = w.split_at_mut(count);
                rest_weights = Some(tail);
                head
            });
            rows.push((row, row_weights));
        }

        self.exec.try_for_each_mut(&mut rows, |v, (row, row_weights)| {
            let mut entries = try_vec_with_capacity(row.len())?;
            self.slabs[v].collect_into(&mut entries);
            debug_assert_eq!(entries.len(), row.len());
            entries.sort_unstable_by_key(|&(key, _)| key);
            for (i, (key, bits)) in entries.into_iter().enumerate() {
                row[i] = V::from_index(key as usize);
                if let Some(w) = row_weights {
                    w[i] = W::from_bits(bits);
                }
            }
            Ok(())
        })?;
        drop(rows);

        debug_event!(vertices = n, edges = m, "dynamic graph exported to csr");
        Ok(CsrView::new(offsets, indices, weights))
    }

    /// Vertex count. Fixed at construction.
    #[inline]
    pub fn number_of_vertices(&self) -> usize {
        self.slabs.len()
    }

    /// Live edge count.
    #[inline]
    pub fn number_of_edges(&self, _token: &GraphToken<'brand>) -> usize {
        self.edges.load(Ordering::Acquire)
    }

    /// Out-degree of `v`.
    ///
    /// # Panics
    /// Panics if `v` is out of range.
    #[inline]
    pub fn neighbor_list_length(&self, _token: &GraphToken<'brand>, v: V) -> usize {
        self.slab(v).len()
    }

    /// Whether `source -> destination` is present.
    ///
    /// # Panics
    /// Panics if either endpoint is out of range.
    pub fn contains_edge(&self, token: &GraphToken<'brand>, source: V, destination: V) -> bool {
        self.edge_weight(token, source, destination).is_some()
    }

    /// Weight of `source -> destination`, or `None` if absent.
    ///
    /// # Panics
    /// Panics if either endpoint is out of range.
    pub fn edge_weight(&self, _token: &GraphToken<'brand>, source: V, destination: V) -> Option<W> {
        self.check_vertex(destination);
        self.slab(source).get(key_of(destination)).map(W::from_bits)
    }

    /// Out-neighbors of `v`, sorted.
    ///
    /// # Panics
    /// Panics if `v` is out of range.
    #[allow(clippy::cast_possible_truncation)]
    pub fn neighbors(&self, _token: &GraphToken<'brand>, v: V) -> Vec<V> {
        let slab = self.slab(v);
        let mut entries = Vec::with_capacity(slab.len());
        slab.collect_into(&mut entries);
        let mut out: Vec<V> = entries.into_iter().map(|(key, _)| V::from_index(key as usize)).collect();
        out.sort_unstable();
        out
    }

    /// Properties attached at construction.
    #[inline]
    pub fn properties(&self) -> GraphProperties {
        self.properties
    }

    /// Configuration the graph was built with.
    #[inline]
    pub fn config(&self) -> &DynamicGraphConfig {
        &self.config
    }

    /// Slab occupancy across the graph.
    pub fn slab_stats(&self, _token: &GraphToken<'brand>) -> SlabStats {
        self.slabs.iter().fold(
            SlabStats {
                vertices: self.slabs.len(),
                ..SlabStats::default()
            },
            |mut acc, slab| {
                acc.live += slab.len();
                acc.tombstones += slab.tombstones();
                acc.blocks += slab.block_count();
                acc
            },
        )
    }

    /// Rebuilds every slab whose tombstones outnumber its live entries.
    ///
    /// Delete batches already do this for the slabs they touch, so this sweep
    /// usually finds nothing. Returns the number of slabs rebuilt.
    ///
    /// # Errors
    /// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if a
    /// replacement slab cannot be reserved. Slabs already rebuilt stay rebuilt.
    pub fn compact(&mut self, _token: &mut GraphToken<'brand>) -> GraphResult<usize> {
        let slab_config = self.config.slab;
        let rebuilt = AtomicUsize::new(0);
        self.exec.try_for_each_mut(&mut self.slabs, |_, slab| {
            if slab.compact(&slab_config)? {
                rebuilt.fetch_add(1, Ordering::Relaxed);
            }
            Ok(())
        })?;
        let rebuilt = rebuilt.into_inner();
        debug_event!(rebuilt, "slabs compacted");
        Ok(rebuilt)
    }

    /// Frees every slab. The graph is consumed and cannot be used afterwards.
    pub fn release(self, _token: &mut GraphToken<'brand>) {
        debug_event!(
            vertices = self.slabs.len(),
            edges = self.edges.load(Ordering::Acquire),
            "dynamic graph released"
        );
        drop(self);
    }

    #[inline]
    fn slab(&self, v: V) -> &VertexSlab {
        self.check_vertex(v);
        &self.slabs[v.index()]
    }

    #[inline]
    fn check_vertex(&self, v: V) {
        assert!(
            v.index() < self.slabs.len(),
            "vertex {v:?} out of bounds for n={}",
            self.slabs.len()
        );
    }
}

impl<V, W> core::fmt::Debug for DynamicGraph<'_, V, W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DynamicGraph")
            .field("vertices", &self.slabs.len())
            .field("edges", &self.edges.load(Ordering::Acquire))
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

#[inline]
fn key_of<V: GraphIndex>(v: V) -> u64 {
    v.index() as u64
}

#[cfg(test)]
mod tests;
