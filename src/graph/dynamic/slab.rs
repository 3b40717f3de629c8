//! Per-vertex slab storage.
//!
//! A vertex's neighbor set lives in a chain of open-addressed blocks. Each slot
//! is one `AtomicU64` key plus one `AtomicU64` of weight bits, so a claim is a
//! single compare-and-swap and no locks are taken anywhere.
//!
//! Slot states only move forward: `EMPTY -> key -> TOMBSTONE`. Because slots
//! never return to `EMPTY`, every thread inserting the same key walks the same
//! probe sequence and races for the same first free slot; the loser observes
//! the winner's key and reports the edge as already present.
//!
//! Blocks are installed by CAS on the previous block's link. A thread that
//! loses the install race frees its own block and continues in the winner's.

use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicU64, AtomicUsize, Ordering};

use crossbeam_utils::Backoff;
use serde::{Deserialize, Serialize};

use crate::error::GraphResult;
use crate::memory::try_vec_with_capacity;

/// Never-claimed slot. Lookups stop here.
pub(crate) const EMPTY: u64 = u64::MAX;
/// Deleted slot. Lookups continue past it; inserts never reuse it, compaction
/// reclaims it.
pub(crate) const TOMBSTONE: u64 = u64::MAX - 1;

/// Fibonacci hashing multiplier (2^64 / golden ratio).
const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

/// Sizing policy for vertex slabs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlabConfig {
    /// Smallest block a slab allocates. Power of two.
    pub min_block_capacity: usize,
    /// Target occupancy of a freshly sized block, in `(0, 1]`.
    pub load_factor: f64,
    /// Capacity multiplier from one block in a chain to the next. Power of two, `>= 2`.
    pub growth_factor: usize,
}

impl SlabConfig {
    /// Checks the sizing policy.
    ///
    /// # Panics
    /// Panics on a non power-of-two capacity or growth factor, a growth factor
    /// below 2, or a load factor outside `(0, 1]`.
    pub fn validate(&self) {
        assert!(
            self.min_block_capacity.is_power_of_two(),
            "min_block_capacity must be a power of two, got {}",
            self.min_block_capacity
        );
        assert!(
            self.load_factor > 0.0 && self.load_factor <= 1.0,
            "load_factor must be in (0, 1], got {}",
            self.load_factor
        );
        assert!(
            self.growth_factor >= 2 && self.growth_factor.is_power_of_two(),
            "growth_factor must be a power of two >= 2, got {}",
            self.growth_factor
        );
    }

    /// Capacity of the first block for a vertex expected to hold `degree` neighbors.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn initial_capacity(&self, degree: usize) -> usize {
        let wanted = (degree as f64 / self.load_factor).ceil() as usize;
        wanted.next_power_of_two().max(self.min_block_capacity)
    }
}

impl Default for SlabConfig {
    fn default() -> Self {
        Self {
            min_block_capacity: 8,
            load_factor: 0.7,
            growth_factor: 2,
        }
    }
}

/// Result of a single-edge insert or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Applied,
    Unchanged,
}

enum Probe {
    Done(Outcome),
    Full,
}

enum Search {
    Found(usize),
    Missing,
    NextBlock,
}

struct SlabBlock {
    keys: Box<[AtomicU64]>,
    values: Box<[AtomicU64]>,
    next: AtomicPtr<SlabBlock>,
}

impl SlabBlock {
    fn new(capacity: usize) -> GraphResult<Self> {
        debug_assert!(capacity.is_power_of_two());
        let mut keys = try_vec_with_capacity(capacity)?;
        keys.resize_with(capacity, || AtomicU64::new(EMPTY));
        let mut values = try_vec_with_capacity(capacity)?;
        values.resize_with(capacity, || AtomicU64::new(0));
        Ok(Self {
            keys: keys.into_boxed_slice(),
            values: values.into_boxed_slice(),
            next: AtomicPtr::new(ptr::null_mut()),
        })
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn home(&self, key: u64) -> usize {
        (key.wrapping_mul(GOLDEN) >> 32) as usize & (self.capacity() - 1)
    }

    fn probe_order(&self, key: u64) -> impl Iterator<Item = usize> {
        let mask = self.capacity() - 1;
        let home = self.home(key);
        (0..self.capacity()).map(move |i| (home + i) & mask)
    }

    fn insert(&self, key: u64, value: u64) -> Probe {
        let backoff = Backoff::new();
        for slot in self.probe_order(key) {
            let mut current = self.keys[slot].load(Ordering::Acquire);
            loop {
                if current == key {
                    return Probe::Done(Outcome::Unchanged);
                }
                if current != EMPTY {
                    break;
                }
                match self.keys[slot].compare_exchange_weak(EMPTY, key, Ordering::AcqRel, Ordering::Acquire) {
                    Ok(_) => {
                        self.values[slot].store(value, Ordering::Release);
                        return Probe::Done(Outcome::Applied);
                    }
                    Err(actual) => {
                        if actual == EMPTY {
                            backoff.spin();
                        }
                        current = actual;
                    }
                }
            }
        }
        Probe::Full
    }

    fn search(&self, key: u64) -> Search {
        for slot in self.probe_order(key) {
            match self.keys[slot].load(Ordering::Acquire) {
                k if k == key => return Search::Found(slot),
                EMPTY => return Search::Missing,
                _ => {}
            }
        }
        Search::NextBlock
    }

    fn live(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.keys.iter().zip(self.values.iter()).filter_map(|(k, v)| {
            let key = k.load(Ordering::Acquire);
            (key != EMPTY && key != TOMBSTONE).then(|| (key, v.load(Ordering::Acquire)))
        })
    }
}

/// The neighbor set of one vertex.
pub(crate) struct VertexSlab {
    head: AtomicPtr<SlabBlock>,
    first_capacity: usize,
    growth_factor: usize,
    len: AtomicUsize,
    tombstones: AtomicUsize,
}

impl VertexSlab {
    /// An empty slab; the first block is allocated on first insert.
    pub(crate) fn new(first_capacity: usize, growth_factor: usize) -> Self {
        Self {
            head: AtomicPtr::new(ptr::null_mut()),
            first_capacity,
            growth_factor,
            len: AtomicUsize::new(0),
            tombstones: AtomicUsize::new(0),
        }
    }

    /// Live entries.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones.load(Ordering::Acquire)
    }

    /// Adds `key` with `value` unless `key` is already live.
    pub(crate) fn insert(&self, key: u64, value: u64) -> GraphResult<Outcome> {
        debug_assert!(key < TOMBSTONE);
        let mut link = &self.head;
        let mut capacity = self.first_capacity;
        loop {
            let block = Self::block_at(link, capacity)?;
            match block.insert(key, value) {
                Probe::Done(outcome) => {
                    if outcome == Outcome::Applied {
                        self.len.fetch_add(1, Ordering::AcqRel);
                    }
                    return Ok(outcome);
                }
                Probe::Full => {
                    capacity = block.capacity() * self.growth_factor;
                    link = &block.next;
                }
            }
        }
    }

    /// Tombstones `key` if it is live.
    pub(crate) fn remove(&self, key: u64) -> Outcome {
        let Some((block, slot)) = self.locate(key) else {
            return Outcome::Unchanged;
        };
        match block.keys[slot].compare_exchange(key, TOMBSTONE, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => {
                self.len.fetch_sub(1, Ordering::AcqRel);
                self.tombstones.fetch_add(1, Ordering::AcqRel);
                Outcome::Applied
            }
            // Another lane deleted the same key first.
            Err(_) => Outcome::Unchanged,
        }
    }

    /// Weight bits stored with `key`, if live.
    pub(crate) fn get(&self, key: u64) -> Option<u64> {
        self.locate(key)
            .map(|(block, slot)| block.values[slot].load(Ordering::Acquire))
    }

    /// Appends every live `(key, value)` pair to `out`.
    pub(crate) fn collect_into(&self, out: &mut Vec<(u64, u64)>) {
        let mut block = self.head.load(Ordering::Acquire);
        // SAFETY: blocks reachable from `head` are only freed in `Drop`, which
        // needs `&mut self`.
        while let Some(b) = unsafe { block.as_ref() } {
            out.extend(b.live());
            block = b.next.load(Ordering::Acquire);
        }
    }

    /// Whether tombstones outnumber live entries.
    #[inline]
    pub(crate) fn needs_compaction(&self) -> bool {
        self.tombstones() > self.len()
    }

    /// Rebuilds the slab without tombstones if they outnumber live entries.
    ///
    /// Returns `true` if the slab was rebuilt.
    pub(crate) fn compact(&mut self, config: &SlabConfig) -> GraphResult<bool> {
        // SAFETY: `&mut self` rules out any other access.
        unsafe { self.compact_exclusive(config) }
    }

    /// [`VertexSlab::compact`] through a shared reference.
    ///
    /// # Safety
    /// No other thread may touch this slab until the call returns, and no block
    /// reference obtained from it may outlive the call.
    pub(crate) unsafe fn compact_exclusive(&self, config: &SlabConfig) -> GraphResult<bool> {
        if !self.needs_compaction() {
            return Ok(false);
        }
        let mut entries = try_vec_with_capacity(self.len())?;
        self.collect_into(&mut entries);
        let fresh = Self::new(config.initial_capacity(entries.len()), self.growth_factor);
        for (key, value) in entries {
            fresh.insert(key, value)?;
        }
        let chain = fresh.head.swap(ptr::null_mut(), Ordering::AcqRel);
        let stale = self.head.swap(chain, Ordering::AcqRel);
        self.len.store(fresh.len(), Ordering::Release);
        self.tombstones.store(0, Ordering::Release);
        // SAFETY: `stale` is unreachable from `head` now, and the caller
        // guarantees nobody else is walking it.
        unsafe { free_chain(stale) };
        Ok(true)
    }

    /// Blocks in the chain.
    pub(crate) fn block_count(&self) -> usize {
        let mut count = 0;
        let mut block = self.head.load(Ordering::Acquire);
        // SAFETY: see `collect_into`.
        while let Some(b) = unsafe { block.as_ref() } {
            count += 1;
            block = b.next.load(Ordering::Acquire);
        }
        count
    }

    fn locate(&self, key: u64) -> Option<(&SlabBlock, usize)> {
        let mut block = self.head.load(Ordering::Acquire);
        // SAFETY: see `collect_into`.
        while let Some(b) = unsafe { block.as_ref() } {
            match b.search(key) {
                Search::Found(slot) => return Some((b, slot)),
                Search::Missing => return None,
                Search::NextBlock => block = b.next.load(Ordering::Acquire),
            }
        }
        None
    }

    /// Returns the block behind `link`, installing a fresh one if it is null.
    fn block_at(link: &AtomicPtr<SlabBlock>, capacity: usize) -> GraphResult<&SlabBlock> {
        let current = link.load(Ordering::Acquire);
        // SAFETY: non-null links point to blocks owned by this slab until `Drop`.
        if let Some(block) = unsafe { current.as_ref() } {
            return Ok(block);
        }

        let fresh = Box::into_raw(Box::new(SlabBlock::new(capacity)?));
        match link.compare_exchange(ptr::null_mut(), fresh, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => {
                trace_event!(capacity, "slab block installed");
                // SAFETY: `fresh` was just published and is owned by the chain.
                Ok(unsafe { &*fresh })
            }
            Err(winner) => {
                // SAFETY: `fresh` was never published, so this thread still owns it.
                drop(unsafe { Box::from_raw(fresh) });
                // SAFETY: `winner` is non-null and owned by the chain.
                Ok(unsafe { &*winner })
            }
        }
    }
}

impl Drop for VertexSlab {
    fn drop(&mut self) {
        // SAFETY: `&mut self` means no other reference into the chain exists.
        unsafe { free_chain(*self.head.get_mut()) };
    }
}

/// Frees `block` and every block linked after it.
///
/// # Safety
/// The chain must be unreachable by any other thread, and each block must come
/// from `Box::into_raw` in `block_at`.
unsafe fn free_chain(mut block: *mut SlabBlock) {
    while !block.is_null() {
        // SAFETY: upheld by the caller.
        let mut owned = unsafe { Box::from_raw(block) };
        block = *owned.next.get_mut();
    }
}

impl core::fmt::Debug for VertexSlab {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VertexSlab")
            .field("len", &self.len())
            .field("tombstones", &self.tombstones())
            .field("blocks", &self.block_count())
            .finish()
    }
}
