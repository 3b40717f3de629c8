//! `Executor` - the execution stream that batches and conversions are submitted to.
//!
//! The controlling thread submits one whole operation at a time and blocks until
//! it has completed, so operations issued by one thread execute in submission
//! order. Inside an operation, iterations run across the executor's lanes.

#[cfg(feature = "parallel")]
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::concurrency::LaunchConfig;
use crate::error::GraphResult;
#[cfg(feature = "parallel")]
use crate::error::GraphError;
use crate::memory::try_vec_with_capacity;

/// Runs data-parallel loops according to a [`LaunchConfig`].
///
/// Cloning is cheap; clones share the same dedicated pool, if any.
#[derive(Clone)]
pub struct Executor {
    config: LaunchConfig,
    #[cfg(feature = "parallel")]
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Executor {
    /// Creates an executor. `config.workers > 0` builds a dedicated pool.
    ///
    /// # Errors
    /// Returns [`GraphError::Execution`] if the worker pool cannot be started.
    pub fn new(config: LaunchConfig) -> GraphResult<Self> {
        #[cfg(feature = "parallel")]
        {
            let pool = if config.workers == 0 {
                None
            } else {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(config.workers)
                    .thread_name(|i| format!("slabgraph-lane-{i}"))
                    .build()
                    .map_err(|e| GraphError::Execution(e.to_string()))?;
                debug_event!(workers = config.workers, "dedicated executor pool started");
                Some(Arc::new(pool))
            };
            Ok(Self { config, pool })
        }
        #[cfg(not(feature = "parallel"))]
        {
            Ok(Self { config })
        }
    }

    /// The launch configuration this executor was built with.
    #[inline]
    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Number of lanes work is spread across.
    pub fn lanes(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            match &self.pool {
                Some(pool) => pool.current_num_threads(),
                None => rayon::current_num_threads(),
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    }

    /// Submits `f` and blocks until it completes.
    pub fn run<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        #[cfg(feature = "parallel")]
        {
            match &self.pool {
                Some(pool) => pool.install(f),
                None => f(),
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            f()
        }
    }

    /// Runs `f(i)` for every `i in 0..len`.
    pub(crate) fn for_each<F>(&self, len: usize, f: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            let grain = self.config.grain.max(1);
            self.run(|| (0..len).into_par_iter().with_min_len(grain).for_each(f));
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..len).for_each(f);
        }
    }

    /// Runs `f(i)` for every `i in 0..len`, stopping at the first failure.
    ///
    /// Iterations already running when a failure occurs still finish, so a failed
    /// call may have applied part of its work.
    pub(crate) fn try_for_each<F>(&self, len: usize, f: F) -> GraphResult<()>
    where
        F: Fn(usize) -> GraphResult<()> + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            let grain = self.config.grain.max(1);
            self.run(|| (0..len).into_par_iter().with_min_len(grain).try_for_each(f))
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..len).try_for_each(f)
        }
    }

    /// Collects `f(i)` for every `i in 0..len`, in index order.
    pub(crate) fn map<T, F>(&self, len: usize, f: F) -> GraphResult<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        let mut out = try_vec_with_capacity(len)?;
        #[cfg(feature = "parallel")]
        {
            let grain = self.config.grain.max(1);
            self.run(|| {
                (0..len)
                    .into_par_iter()
                    .with_min_len(grain)
                    .map(f)
                    .collect_into_vec(&mut out);
            });
        }
        #[cfg(not(feature = "parallel"))]
        {
            out.extend((0..len).map(f));
        }
        Ok(out)
    }

    /// Runs `f(i, &mut items[i])` for every item, stopping at the first failure.
    pub(crate) fn try_for_each_mut<T, F>(&self, items: &mut [T], f: F) -> GraphResult<()>
    where
        T: Send,
        F: Fn(usize, &mut T) -> GraphResult<()> + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            let grain = self.config.grain.max(1);
            self.run(|| {
                items
                    .par_iter_mut()
                    .with_min_len(grain)
                    .enumerate()
                    .try_for_each(|(i, item)| f(i, item))
            })
        }
        #[cfg(not(feature = "parallel"))]
        {
            items.iter_mut().enumerate().try_for_each(|(i, item)| f(i, item))
        }
    }

    /// Maps every index and folds the results with an associative `reduce`.
    pub(crate) fn map_reduce<T, M, R>(&self, len: usize, identity: T, map: M, reduce: R) -> T
    where
        T: Copy + Send + Sync,
        M: Fn(usize) -> T + Sync + Send,
        R: Fn(T, T) -> T + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            let grain = self.config.grain.max(1);
            self.run(|| {
                (0..len)
                    .into_par_iter()
                    .with_min_len(grain)
                    .map(map)
                    .reduce(|| identity, reduce)
            })
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..len).map(map).fold(identity, reduce)
        }
    }
}

impl Default for Executor {
    /// A probed configuration on the process-wide pool.
    fn default() -> Self {
        Self {
            config: LaunchConfig::probe(),
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }
}

impl core::fmt::Debug for Executor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .field("lanes", &self.lanes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn for_each_visits_every_index_once() {
        let exec = Executor::default();
        let hits: Vec<AtomicUsize> = (0..1000).map(|_| AtomicUsize::new(0)).collect();
        exec.for_each(hits.len(), |i| {
            hits[i].fetch_add(1, Ordering::Relaxed);
        });
        assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn map_preserves_index_order() {
        let exec = Executor::default();
        let out = exec.map(500, |i| i * 2).unwrap();
        assert_eq!(out, (0..500).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn try_for_each_surfaces_failure() {
        let exec = Executor::default();
        let res = exec.try_for_each(100, |i| {
            if i == 42 {
                Err(crate::GraphError::Execution("lane fault".into()))
            } else {
                Ok(())
            }
        });
        assert_eq!(res, Err(crate::GraphError::Execution("lane fault".into())));
    }

    #[test]
    fn dedicated_pool_runs_work() {
        let exec = Executor::new(LaunchConfig::probe().with_workers(2)).unwrap();
        let total = exec.map_reduce(10, 0usize, |i| i, |a, b| a + b);
        assert_eq!(total, 45);
        #[cfg(feature = "parallel")]
        assert_eq!(exec.lanes(), 2);
    }
}
