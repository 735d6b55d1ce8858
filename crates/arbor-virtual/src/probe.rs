//! Measurement port.
//!
//! The presentation layer owns the materialized row elements; the
//! virtualizer only asks "how tall is this one now?". A probe answers with
//! the measured extent, or `None` when measurement is not possible (element
//! detached, layout not ready). `None` never changes any size.

use std::cell::Cell;
use std::collections::HashMap;
use std::hash::Hash;

/// Measures rendered elements.
pub trait SizeProbe {
    /// Handle to a rendered element.
    type Handle: ?Sized;

    /// Current extent of `handle` along the scroll axis.
    fn measure(&self, handle: &Self::Handle) -> Option<u32>;
}

impl<P: SizeProbe + ?Sized> SizeProbe for &P {
    type Handle = P::Handle;

    fn measure(&self, handle: &Self::Handle) -> Option<u32> {
        (**self).measure(handle)
    }
}

/// Probe answering from a fixed table; unknown handles fail to measure.
#[derive(Debug, Clone)]
pub struct ScriptedProbe<H> {
    sizes: HashMap<H, u32>,
    calls: Cell<usize>,
}

impl<H> Default for ScriptedProbe<H> {
    fn default() -> Self {
        Self {
            sizes: HashMap::new(),
            calls: Cell::new(0),
        }
    }
}

impl<H: Eq + Hash> ScriptedProbe<H> {
    /// Create a probe that fails every measurement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `size` for `handle`.
    #[must_use]
    pub fn with_size(mut self, handle: H, size: u32) -> Self {
        self.sizes.insert(handle, size);
        self
    }

    /// Change the answer for `handle`.
    pub fn set_size(&mut self, handle: H, size: u32) {
        self.sizes.insert(handle, size);
    }

    /// Make `handle` fail to measure.
    pub fn detach(&mut self, handle: &H) {
        self.sizes.remove(handle);
    }

    /// Number of measurements requested so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<H: Eq + Hash> SizeProbe for ScriptedProbe<H> {
    type Handle = H;

    fn measure(&self, handle: &H) -> Option<u32> {
        self.calls.set(self.calls.get() + 1);
        self.sizes.get(handle).copied()
    }
}
