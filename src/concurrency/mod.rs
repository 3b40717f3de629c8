//! Execution backend: launch configuration, execution stream, prefix scan.
//!
//! The backend models a data-parallel device on the host: a pool of worker
//! lanes (rayon, behind the `parallel` feature) fed by a controlling thread that
//! submits whole operations and blocks until they complete.

pub mod executor;
pub mod launch;
pub mod scan;

pub use executor::Executor;
pub use launch::LaunchConfig;
pub use scan::{offsets_from_counts, reduce, scan, scan_in_place, FnOp, Max, Min, ScanMode, ScanOp, Sum};
