//! Parallel prefix scan.
//!
//! Blocked reduce-then-scan, the layout a device kernel would use:
//! 1. every block of `scan_block` elements is reduced in parallel,
//! 2. the block sums are scanned (exclusive) on the controlling thread,
//! 3. every block is rescanned in parallel, seeded with its carry.
//!
//! The operator only has to be associative; blocks are combined strictly left to
//! right, so non-commutative operators scan correctly as well.

use core::ops::Add;
use core::sync::atomic::{fence, Ordering};

use num_traits::{Bounded, Zero};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::concurrency::Executor;
use crate::error::GraphResult;
use crate::graph::GraphIndex;
use crate::memory::try_vec_with_capacity;

/// Which prefix a scan produces at each position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanMode {
    /// `out[i] = op(in[0], .., in[i])`.
    Inclusive,
    /// `out[i] = op(in[0], .., in[i - 1])`, identity at `i = 0`.
    Exclusive,
}

/// An associative combining operator with an identity element.
pub trait ScanOp<T>: Sync {
    /// The identity: `combine(identity(), x) == x`.
    fn identity(&self) -> T;
    /// Combines two partial results, `a` preceding `b`.
    fn combine(&self, a: T, b: T) -> T;
}

/// Addition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl<T: Copy + Zero + Add<Output = T>> ScanOp<T> for Sum {
    #[inline]
    fn identity(&self) -> T {
        T::zero()
    }

    #[inline]
    fn combine(&self, a: T, b: T) -> T {
        a + b
    }
}

/// Running maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

impl<T: Copy + Bounded + PartialOrd> ScanOp<T> for Max {
    #[inline]
    fn identity(&self) -> T {
        T::min_value()
    }

    #[inline]
    fn combine(&self, a: T, b: T) -> T {
        if b > a {
            b
        } else {
            a
        }
    }
}

/// Running minimum.
#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

impl<T: Copy + Bounded + PartialOrd> ScanOp<T> for Min {
    #[inline]
    fn identity(&self) -> T {
        T::max_value()
    }

    #[inline]
    fn combine(&self, a: T, b: T) -> T {
        if b < a {
            b
        } else {
            a
        }
    }
}

/// An operator built from a closure and its identity.
#[derive(Debug, Clone, Copy)]
pub struct FnOp<T, F> {
    identity: T,
    f: F,
}

impl<T, F> FnOp<T, F> {
    /// `f` must be associative and `identity` neutral for it.
    pub fn new(identity: T, f: F) -> Self {
        Self { identity, f }
    }
}

impl<T, F> ScanOp<T> for FnOp<T, F>
where
    T: Copy + Sync,
    F: Fn(T, T) -> T + Sync,
{
    #[inline]
    fn identity(&self) -> T {
        self.identity
    }

    #[inline]
    fn combine(&self, a: T, b: T) -> T {
        (self.f)(a, b)
    }
}

/// Scans `input` into `output` and returns the total reduction.
///
/// The call always blocks until the scan has completed, whatever `sync` says.
/// `sync` only adds a sequentially-consistent fence after completion, publishing
/// the output to threads outside the executor.
///
/// # Panics
/// Panics if `input` and `output` differ in length.
///
/// # Errors
/// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if the block
/// scratch space cannot be reserved.
pub fn scan<T, O>(
    exec: &Executor,
    input: &[T],
    output: &mut [T],
    mode: ScanMode,
    op: &O,
    sync: bool,
) -> GraphResult<T>
where
    T: Copy + Send + Sync,
    O: ScanOp<T>,
{
    assert_eq!(
        input.len(),
        output.len(),
        "scan input and output lengths differ"
    );
    output.copy_from_slice(input);
    scan_in_place(exec, output, mode, op, sync)
}

/// Scans `data` in place and returns the total reduction.
///
/// An empty sequence is a no-op whose reduction is the identity. Blocks until
/// the scan has completed; `sync` behaves as in [`scan`].
///
/// # Errors
/// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if the block
/// scratch space cannot be reserved.
pub fn scan_in_place<T, O>(
    exec: &Executor,
    data: &mut [T],
    mode: ScanMode,
    op: &O,
    sync: bool,
) -> GraphResult<T>
where
    T: Copy + Send + Sync,
    O: ScanOp<T>,
{
    let block = exec.config().scan_block.max(1);
    let total = if data.len() <= block {
        scan_block(data, op.identity(), mode, op)
    } else {
        let sums = block_sums(exec, data, block, op)?;
        let mut carries = try_vec_with_capacity(sums.len())?;
        let mut acc = op.identity();
        for &s in &sums {
            carries.push(acc);
            acc = op.combine(acc, s);
        }
        rescan_blocks(exec, data, block, &carries, mode, op);
        acc
    };
    if sync {
        fence(Ordering::SeqCst);
    }
    trace_event!(len = data.len(), ?mode, "scan complete");
    Ok(total)
}

/// Reduces `input` with `op`. Returns the identity for an empty input.
///
/// # Errors
/// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if the block
/// scratch space cannot be reserved.
pub fn reduce<T, O>(exec: &Executor, input: &[T], op: &O) -> GraphResult<T>
where
    T: Copy + Send + Sync,
    O: ScanOp<T>,
{
    let block = exec.config().scan_block.max(1);
    let sums = block_sums(exec, input, block, op)?;
    Ok(sums
        .into_iter()
        .fold(op.identity(), |a, b| op.combine(a, b)))
}

/// Turns per-vertex counts into an `n + 1` offset table.
///
/// `offsets[0] = 0`, `offsets[i + 1] = offsets[i] + counts[i]`, and the last entry
/// is the total.
///
/// # Errors
/// Returns [`GraphError::Allocation`](crate::GraphError::Allocation) if the table
/// or scan scratch space cannot be reserved.
///
/// # Panics
/// Panics if the total does not fit in `E`.
pub fn offsets_from_counts<E: GraphIndex>(exec: &Executor, counts: &[usize]) -> GraphResult<Vec<E>> {
    let mut offsets: Vec<usize> = try_vec_with_capacity(counts.len() + 1)?;
    offsets.extend_from_slice(counts);
    let total = scan_in_place(exec, &mut offsets, ScanMode::Exclusive, &Sum, true)?;
    assert!(
        E::try_from_index(total).is_some(),
        "edge count {total} does not fit in offset type {}",
        core::any::type_name::<E>()
    );
    offsets.push(total);
    let mut out = try_vec_with_capacity(offsets.len())?;
    out.extend(offsets.into_iter().map(E::from_index));
    Ok(out)
}

fn scan_block<T: Copy, O: ScanOp<T>>(data: &mut [T], carry: T, mode: ScanMode, op: &O) -> T {
    let mut acc = carry;
    match mode {
        ScanMode::Inclusive => {
            for x in data.iter_mut() {
                acc = op.combine(acc, *x);
                *x = acc;
            }
        }
        ScanMode::Exclusive => {
            for x in data.iter_mut() {
                let v = *x;
                *x = acc;
                acc = op.combine(acc, v);
            }
        }
    }
    acc
}

fn reduce_block<T: Copy, O: ScanOp<T>>(data: &[T], op: &O) -> T {
    data.iter().fold(op.identity(), |a, &b| op.combine(a, b))
}

fn block_sums<T, O>(exec: &Executor, data: &[T], block: usize, op: &O) -> GraphResult<Vec<T>>
where
    T: Copy + Send + Sync,
    O: ScanOp<T>,
{
    let mut sums = try_vec_with_capacity(data.len().div_ceil(block))?;
    #[cfg(feature = "parallel")]
    exec.run(|| {
        data.par_chunks(block)
            .map(|chunk| reduce_block(chunk, op))
            .collect_into_vec(&mut sums);
    });
    #[cfg(not(feature = "parallel"))]
    {
        let _ = exec;
        sums.extend(data.chunks(block).map(|chunk| reduce_block(chunk, op)));
    }
    Ok(sums)
}

fn rescan_blocks<T, O>(
    exec: &Executor,
    data: &mut [T],
    block: usize,
    carries: &[T],
    mode: ScanMode,
    op: &O,
) where
    T: Copy + Send + Sync,
    O: ScanOp<T>,
{
    #[cfg(feature = "parallel")]
    exec.run(|| {
        data.par_chunks_mut(block)
            .zip(carries.par_iter())
            .for_each(|(chunk, &carry)| {
                scan_block(chunk, carry, mode, op);
            });
    });
    #[cfg(not(feature = "parallel"))]
    {
        let _ = exec;
        for (chunk, &carry) in data.chunks_mut(block).zip(carries) {
            scan_block(chunk, carry, mode, op);
        }
    }
}
