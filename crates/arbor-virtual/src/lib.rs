#![forbid(unsafe_code)]

//! Windowed rendering for Arbor.
//!
//! Given the keys of a long item sequence, a viewport extent and a scroll
//! offset, a [`Virtualizer`] computes which items to materialize and where
//! they sit. Item sizes begin as an estimate and converge to measured values
//! reported through [`Virtualizer::measure`] or a [`SizeProbe`].

pub mod fenwick;
pub mod probe;
pub mod size_cache;
pub mod virtualizer;

pub use fenwick::FenwickTree;
pub use probe::{ScriptedProbe, SizeProbe};
pub use size_cache::{CacheStats, SizeCache};
pub use virtualizer::{
    Align, DEFAULT_ESTIMATE_SIZE, DEFAULT_OVERSCAN, VirtualItem, Virtualizer, VirtualizerOptions,
};
