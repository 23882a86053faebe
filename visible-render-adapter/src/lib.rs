//! Host-side helpers for the `visible-render` crate.
//!
//! `visible-render` only defines capabilities; this crate provides ready-made implementations of
//! the ones that need no presentation surface:
//!
//! - [`PerformanceMonitor`]: an `InstrumentationSink` deriving FPS, memory growth and threshold
//!   warnings from host-supplied samples, with a plain-text overlay
//! - [`DefaultDataSource`]: a `DataSource` of generated rows with deterministic heights
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod data;
mod performance;

#[cfg(test)]
mod tests;

pub use data::{DataItem, DefaultDataSource};
pub use performance::{
    PerformanceMetrics, PerformanceMonitor, PerformanceWarning, WarningKind, format_bytes,
};
