//! Offset-indexed storage shared by CSR and CSC.
//!
//! Both layouts are an offset table over "owner" vertices plus one index per
//! edge naming the opposite endpoint. CSR owns by source, CSC by destination;
//! everything else is identical, so the views are thin role-naming wrappers.

use core::ops::Range;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::concurrency::{offsets_from_counts, Executor};
use crate::error::GraphResult;
use crate::graph::{GraphIndex, Weight};
use crate::memory::{try_filled_vec, try_vec_with_capacity, Buffer, Residency};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Compressed<V, E, W> {
    offsets: Buffer<E>,
    indices: Buffer<V>,
    weights: Option<Buffer<W>>,
}

impl<V: GraphIndex, E: GraphIndex, W: Weight> Compressed<V, E, W> {
    /// Validates and wraps the three arrays.
    ///
    /// # Panics
    /// - if `offsets` is empty or `offsets[0] != 0`
    /// - if offsets are not monotone
    /// - if the last offset differs from `indices.len()`
    /// - if an index is out of range or weights have the wrong length
    pub(crate) fn new(offsets: Buffer<E>, indices: Buffer<V>, weights: Option<Buffer<W>>) -> Self {
        assert!(!offsets.is_empty(), "offsets must have length n+1");
        assert!(offsets[0] == E::zero(), "offsets must start at 0");
        for w in offsets.windows(2) {
            assert!(w[0] <= w[1], "offsets must be monotone");
        }
        let n = offsets.len() - 1;
        let m = offsets[n].index();
        assert!(
            m == indices.len(),
            "last offset {m} must equal index count {}",
            indices.len()
        );
        for &v in indices.iter() {
            assert!(v.index() < n, "vertex {v:?} out of bounds for n={n}");
        }
        if let Some(w) = &weights {
            assert!(w.len() == m, "expected {m} weights, got {}", w.len());
        }
        Self {
            offsets,
            indices,
            weights,
        }
    }

    #[inline]
    pub(crate) fn number_of_vertices(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub(crate) fn number_of_edges(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub(crate) fn offsets(&self) -> &Buffer<E> {
        &self.offsets
    }

    #[inline]
    pub(crate) fn indices(&self) -> &Buffer<V> {
        &self.indices
    }

    #[inline]
    pub(crate) fn weights(&self) -> Option<&Buffer<W>> {
        self.weights.as_ref()
    }

    pub(crate) fn residency(&self) -> Residency {
        self.offsets.residency()
    }

    /// Edge-id range owned by `v`.
    #[inline]
    pub(crate) fn range(&self, v: V) -> Range<usize> {
        let v = v.index();
        assert!(
            v < self.number_of_vertices(),
            "vertex {v} out of bounds for n={}",
            self.number_of_vertices()
        );
        self.offsets[v].index()..self.offsets[v + 1].index()
    }

    #[inline]
    pub(crate) fn length(&self, v: V) -> E {
        let v = v.index();
        assert!(
            v < self.number_of_vertices(),
            "vertex {v} out of bounds for n={}",
            self.number_of_vertices()
        );
        self.offsets[v + 1] - self.offsets[v]
    }

    /// Owner of edge `e`: the rightmost `i` with `offsets[i] <= e`.
    ///
    /// Rightmost matters: zero-length lists repeat an offset, and only the last
    /// vertex sharing that offset actually owns the edge.
    #[inline]
    pub(crate) fn owner(&self, e: E) -> V {
        self.check_edge(e);
        let i = self.offsets.partition_point(|&o| o <= e);
        V::from_index(i - 1)
    }

    /// Opposite endpoint stored at edge slot `e`.
    #[inline]
    pub(crate) fn index_at(&self, e: E) -> V {
        self.check_edge(e);
        self.indices[e.index()]
    }

    pub(crate) fn find(&self, owner: V, other: V) -> Option<E> {
        assert!(
            other.index() < self.number_of_vertices(),
            "vertex {other:?} out of bounds for n={}",
            self.number_of_vertices()
        );
        let range = self.range(owner);
        let start = range.start;
        self.indices[range]
            .iter()
            .position(|&x| x == other)
            .map(|i| E::from_index(start + i))
    }

    pub(crate) fn weight(&self, e: E) -> Option<W> {
        self.check_edge(e);
        self.weights.as_ref().map(|w| w[e.index()])
    }

    pub(crate) fn slice(&self, v: V) -> &[V] {
        &self.indices[self.range(v)]
    }

    pub(crate) fn weight_slice(&self, v: V) -> Option<&[W]> {
        let range = self.range(v);
        self.weights.as_ref().map(|w| &w[range])
    }

    pub(crate) fn move_to(&mut self, target: Residency) -> GraphResult<()> {
        self.offsets.move_to(target)?;
        self.indices.move_to(target)?;
        if let Some(w) = &mut self.weights {
            w.move_to(target)?;
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (Vec<E>, Vec<V>, Option<Vec<W>>) {
        (
            self.offsets.into_vec(),
            self.indices.into_vec(),
            self.weights.map(Buffer::into_vec),
        )
    }

    /// Swaps the owner role: CSR becomes CSC and back.
    ///
    /// Counts per new owner in parallel, scans the counts into offsets, then
    /// scatters in old-owner order so each new list stays sorted by old owner.
    pub(crate) fn transpose(&self, exec: &Executor) -> GraphResult<Self> {
        let n = self.number_of_vertices();
        let m = self.number_of_edges();

        let counts = count_by(exec, n, m, |e| self.indices[e].index())?;
        let offsets: Vec<E> = offsets_from_counts(exec, &counts)?;

        let mut cursor: Vec<usize> = try_vec_with_capacity(n)?;
        cursor.extend(offsets[..n].iter().map(|o| o.index()));
        let mut indices = try_filled_vec(m, V::zero())?;
        let mut weights = match &self.weights {
            Some(_) => Some(try_filled_vec(m, W::default())?),
            None => None,
        };

        for owner in 0..n {
            for e in self.offsets[owner].index()..self.offsets[owner + 1].index() {
                let target = self.indices[e].index();
                let slot = cursor[target];
                cursor[target] += 1;
                indices[slot] = V::from_index(owner);
                if let (Some(out), Some(src)) = (&mut weights, &self.weights) {
                    out[slot] = src[e];
                }
            }
        }

        let residency = self.residency();
        trace_event!(n, m, "compressed layout transposed");
        Ok(Self::new(
            Buffer::from_vec(offsets, residency),
            Buffer::from_vec(indices, residency),
            weights.map(|w| Buffer::from_vec(w, residency)),
        ))
    }

    fn check_edge(&self, e: E) {
        assert!(
            e.index() < self.number_of_edges(),
            "edge {e:?} out of bounds for m={}",
            self.number_of_edges()
        );
    }
}

/// Histogram of `key(i)` over `i in 0..len`, computed with atomic counters.
pub(crate) fn count_by<F>(exec: &Executor, buckets: usize, len: usize, key: F) -> GraphResult<Vec<usize>>
where
    F: Fn(usize) -> usize + Sync + Send,
{
    let mut counters: Vec<AtomicUsize> = try_vec_with_capacity(buckets)?;
    counters.resize_with(buckets, || AtomicUsize::new(0));
    exec.for_each(len, |i| {
        counters[key(i)].fetch_add(1, Ordering::Relaxed);
    });
    Ok(counters.into_iter().map(AtomicUsize::into_inner).collect())
}
