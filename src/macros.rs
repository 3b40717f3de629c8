//! Internal logging macros.
//!
//! With the `tracing` feature these forward to `tracing`; without it they expand
//! to nothing, so hot paths carry no logging cost.

#[cfg(feature = "tracing")]
macro_rules! debug_event {
    ($($arg:tt)*) => { ::tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_event {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($($arg:tt)*) => { ::tracing::trace!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($($arg:tt)*) => {};
}
