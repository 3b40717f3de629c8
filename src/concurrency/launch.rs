//! Launch configuration.
//!
//! Tuning values live in a plain struct selected once (usually by [`LaunchConfig::probe`])
//! and injected into an [`Executor`](super::Executor), never in global constants.

use serde::{Deserialize, Serialize};

/// Work partitioning parameters for parallel loops and scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Worker lanes for a dedicated pool. `0` uses the process-wide pool.
    pub workers: usize,
    /// Minimum number of items a single lane processes before work is split.
    pub grain: usize,
    /// Elements per block in the blocked prefix scan.
    pub scan_block: usize,
}

impl LaunchConfig {
    /// Smallest block the scan will use; below this a sequential pass is cheaper.
    pub const MIN_SCAN_BLOCK: usize = 256;

    /// Selects a configuration from the available hardware parallelism.
    ///
    /// Scan blocks are sized so each lane gets a few blocks, which keeps the
    /// sequential pass over block sums short.
    pub fn probe() -> Self {
        let lanes = std::thread::available_parallelism().map_or(1, usize::from);
        Self {
            workers: 0,
            grain: 64,
            scan_block: (4096 / lanes.max(1)).next_power_of_two().max(Self::MIN_SCAN_BLOCK),
        }
    }

    /// Same configuration, forced onto a dedicated pool of `workers` lanes.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Same configuration with a different scan block size.
    pub fn with_scan_block(mut self, scan_block: usize) -> Self {
        self.scan_block = scan_block;
        self
    }

    /// Same configuration with a different grain.
    pub fn with_grain(mut self, grain: usize) -> Self {
        self.grain = grain;
        self
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self::probe()
    }
}
