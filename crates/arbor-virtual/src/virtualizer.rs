#![forbid(unsafe_code)]

//! Windowed renderer for long sequences of variable-size items.
//!
//! A [`Virtualizer`] knows the key and current size of every item, the
//! viewport extent and the scroll offset. From those it answers which items
//! must be materialized ([`Virtualizer::range`]), where each one sits
//! ([`Virtualizer::virtual_items`]) and how tall the whole scroll surface is
//! ([`Virtualizer::total_size`]).
//!
//! # Geometry
//!
//! ```text
//! padding_start | item 0 | gap | item 1 | gap | ... | item n-1 | padding_end
//! ```
//!
//! Item sizes start at `estimate_size` and are replaced by measurements as
//! rows are rendered. Measurements are cached by key in a [`SizeCache`], so
//! a row measured once keeps its size when the item list is rebuilt (rows
//! inserted above it, sibling collapsed, filter applied). Offsets come from
//! a [`FenwickTree`] of `size + gap` slots, keeping both a measurement and an
//! offset lookup at O(log n).
//!
//! # Scroll anchoring
//!
//! When an item that starts above the current scroll offset changes size,
//! the scroll offset moves by the same delta so the content in view stays
//! put. [`Virtualizer::measure`] reports how far the offset moved.
//!
//! # Example
//!
//! ```
//! use arbor_virtual::{Virtualizer, VirtualizerOptions};
//!
//! let mut virt = Virtualizer::new(VirtualizerOptions::new().with_overscan(8));
//! virt.set_items(0..10_000usize);
//! virt.set_viewport(400);
//! virt.set_scroll_offset(4_000);
//!
//! assert_eq!(virt.visible_range(), 100..110);
//! assert_eq!(virt.range(), 92..118);
//! assert_eq!(virt.total_size(), 400_000);
//! ```

use std::hash::Hash;
use std::ops::Range;

use crate::fenwick::FenwickTree;
use crate::probe::SizeProbe;
use crate::size_cache::{CacheStats, SizeCache};

/// Size assumed for items that have not been measured.
pub const DEFAULT_ESTIMATE_SIZE: u32 = 40;

/// Items materialized beyond each edge of the viewport.
pub const DEFAULT_OVERSCAN: usize = 10;

/// Layout options of a [`Virtualizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualizerOptions {
    /// Size of an unmeasured item.
    pub estimate_size: u32,
    /// Extra items rendered above and below the viewport.
    pub overscan: usize,
    /// Space before the first item.
    pub padding_start: u32,
    /// Space after the last item.
    pub padding_end: u32,
    /// Space between consecutive items.
    pub gap: u32,
}

impl Default for VirtualizerOptions {
    fn default() -> Self {
        Self {
            estimate_size: DEFAULT_ESTIMATE_SIZE,
            overscan: DEFAULT_OVERSCAN,
            padding_start: 0,
            padding_end: 0,
            gap: 0,
        }
    }
}

impl VirtualizerOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the estimated item size.
    #[must_use]
    pub fn with_estimate_size(mut self, size: u32) -> Self {
        self.estimate_size = size;
        self
    }

    /// Set the overscan.
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Set both paddings.
    #[must_use]
    pub fn with_padding(mut self, start: u32, end: u32) -> Self {
        self.padding_start = start;
        self.padding_end = end;
        self
    }

    /// Set the gap between items.
    #[must_use]
    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }
}

/// How [`Virtualizer::scroll_to_index`] positions the target item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Scroll only if the item is not fully visible, by the least amount.
    #[default]
    Auto,
    /// Item at the top of the viewport.
    Start,
    /// Item centered in the viewport.
    Center,
    /// Item at the bottom of the viewport.
    End,
}

/// Geometry of one materialized item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualItem<K> {
    /// Position in the item sequence.
    pub index: usize,
    /// Item key.
    pub key: K,
    /// Offset of the item's leading edge.
    pub start: u64,
    /// Current size (measured or estimated).
    pub size: u32,
}

impl<K> VirtualItem<K> {
    /// Offset just past the item.
    #[inline]
    #[must_use]
    pub fn end(&self) -> u64 {
        self.start + u64::from(self.size)
    }
}

/// Windowing state over a keyed item sequence.
#[derive(Debug, Clone)]
pub struct Virtualizer<K> {
    options: VirtualizerOptions,
    keys: Vec<K>,
    sizes: Vec<u32>,
    /// `size + gap` per item.
    slots: FenwickTree,
    cache: SizeCache<K>,
    viewport: u32,
    scroll_offset: u64,
}

impl<K: Clone + Eq + Hash> Default for Virtualizer<K> {
    fn default() -> Self {
        Self::new(VirtualizerOptions::default())
    }
}

impl<K: Clone + Eq + Hash> Virtualizer<K> {
    /// Create an empty virtualizer.
    #[must_use]
    pub fn new(options: VirtualizerOptions) -> Self {
        Self {
            options,
            keys: Vec::new(),
            sizes: Vec::new(),
            slots: FenwickTree::new(0),
            cache: SizeCache::new(),
            viewport: 0,
            scroll_offset: 0,
        }
    }

    /// Set the viewport extent.
    #[must_use]
    pub fn with_viewport(mut self, viewport: u32) -> Self {
        self.viewport = viewport;
        self
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &VirtualizerOptions {
        &self.options
    }

    /// Replace the options; unmeasured items take the new estimate.
    pub fn set_options(&mut self, options: VirtualizerOptions) {
        if self.options == options {
            return;
        }
        let estimate_changed = self.options.estimate_size != options.estimate_size;
        self.options = options;
        if estimate_changed {
            let estimate = self.options.estimate_size;
            let cache = &self.cache;
            for (size, key) in self.sizes.iter_mut().zip(&self.keys) {
                *size = cache.peek(key).unwrap_or(estimate);
            }
        }
        self.rebuild_slots();
        self.clamp_scroll();
    }

    /// Replace the item sequence.
    ///
    /// Sizes come from the measurement cache when the key was measured
    /// before, otherwise from the estimate.
    pub fn set_items(&mut self, keys: impl IntoIterator<Item = K>) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("virtualizer.set_items").entered();

        self.keys = keys.into_iter().collect();
        let estimate = self.options.estimate_size;
        let cache = &mut self.cache;
        self.sizes = self
            .keys
            .iter()
            .map(|key| cache.lookup(key).unwrap_or(estimate))
            .collect();
        self.rebuild_slots();
        self.clamp_scroll();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            items = self.keys.len(),
            total = self.total_size(),
            "virtualizer items set"
        );
    }

    /// Number of items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether there are no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Item keys in order.
    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Viewport extent.
    #[must_use]
    pub fn viewport(&self) -> u32 {
        self.viewport
    }

    /// Set the viewport extent (re-clamps the scroll offset).
    pub fn set_viewport(&mut self, viewport: u32) {
        self.viewport = viewport;
        self.clamp_scroll();
    }

    /// Current scroll offset.
    #[must_use]
    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// Largest valid scroll offset.
    #[must_use]
    pub fn max_scroll_offset(&self) -> u64 {
        self.total_size().saturating_sub(u64::from(self.viewport))
    }

    /// Scroll to `offset`, clamped to `0..=max_scroll_offset()`.
    pub fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll_offset = offset.min(self.max_scroll_offset());
    }

    /// Scroll by `delta` (positive = towards the end).
    pub fn scroll_by(&mut self, delta: i64) {
        let next = if delta.is_negative() {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_offset.saturating_add(delta.unsigned_abs())
        };
        self.set_scroll_offset(next);
    }

    /// Extent of the whole scroll surface; zero when there are no items.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        if self.keys.is_empty() {
            return 0;
        }
        u64::from(self.options.padding_start)
            + self.slots.total().saturating_sub(u64::from(self.options.gap))
            + u64::from(self.options.padding_end)
    }

    /// Offset of the item at `index`.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> Option<u64> {
        (index < self.len()).then(|| self.start_of(index))
    }

    /// Current size of the item at `index`.
    #[must_use]
    pub fn size_of(&self, index: usize) -> Option<u32> {
        self.sizes.get(index).copied()
    }

    /// Whether the item at `index` has a cached measurement.
    #[must_use]
    pub fn is_measured(&self, index: usize) -> bool {
        self.keys
            .get(index)
            .is_some_and(|key| self.cache.contains(key))
    }

    /// Index of the item covering `offset`.
    ///
    /// Offsets inside the leading padding map to the first item, offsets
    /// past the end to the last one. Gaps belong to the preceding item.
    #[must_use]
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let last = self.len().checked_sub(1)?;
        let local = offset.saturating_sub(u64::from(self.options.padding_start));
        let index = self.slots.find_prefix(local).map_or(0, |i| i + 1);
        Some(index.min(last))
    }

    /// Items intersecting the viewport.
    #[must_use]
    pub fn visible_range(&self) -> Range<usize> {
        if self.viewport == 0 {
            return 0..0;
        }
        let Some(first) = self.index_at_offset(self.scroll_offset) else {
            return 0..0;
        };
        let bottom = self.scroll_offset + u64::from(self.viewport) - 1;
        let last = self.index_at_offset(bottom).unwrap_or(first);
        first..last + 1
    }

    /// Items to materialize: the visible range widened by the overscan.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let visible = self.visible_range();
        if visible.is_empty() {
            return visible;
        }
        let overscan = self.options.overscan;
        let end = visible.end.saturating_add(overscan).min(self.len());
        visible.start.saturating_sub(overscan)..end
    }

    /// Geometry of the item at `index`.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<VirtualItem<K>> {
        let key = self.keys.get(index)?;
        Some(VirtualItem {
            index,
            key: key.clone(),
            start: self.start_of(index),
            size: self.sizes[index],
        })
    }

    /// Geometry of every item in [`range`](Self::range).
    #[must_use]
    pub fn virtual_items(&self) -> Vec<VirtualItem<K>> {
        #[cfg(feature = "tracing")]
        let _span = tracing::trace_span!("virtualizer.virtual_items").entered();

        self.range().filter_map(|index| self.item(index)).collect()
    }

    /// Record the measured size of the item at `index`.
    ///
    /// Returns how far the scroll offset moved as a result (non-zero when an
    /// item above the viewport changed size). Out-of-range indices are
    /// ignored.
    pub fn measure(&mut self, index: usize, size: u32) -> i64 {
        let Some(key) = self.keys.get(index) else {
            return 0;
        };
        self.cache.insert(key.clone(), size);

        let old = self.sizes[index];
        if old == size {
            return 0;
        }

        let before = self.scroll_offset;
        let item_start = self.start_of(index);
        self.sizes[index] = size;
        self.slots.set(index, size.saturating_add(self.options.gap));

        if item_start < before {
            let anchored = if size > old {
                before.saturating_add(u64::from(size - old))
            } else {
                before.saturating_sub(u64::from(old - size))
            };
            self.set_scroll_offset(anchored);
        } else {
            self.clamp_scroll();
        }

        let adjustment = self.scroll_offset as i64 - before as i64;

        #[cfg(feature = "tracing")]
        tracing::trace!(index, old, size, adjustment, "item measured");

        adjustment
    }

    /// Measure the item at `index` through `probe`.
    ///
    /// Returns `None` when the probe cannot measure; the item then keeps its
    /// current size.
    pub fn measure_element<P>(&mut self, index: usize, handle: &P::Handle, probe: &P) -> Option<i64>
    where
        P: SizeProbe + ?Sized,
    {
        match probe.measure(handle) {
            Some(size) => Some(self.measure(index, size)),
            None => {
                #[cfg(feature = "tracing")]
                tracing::trace!(index, "measurement unavailable, keeping estimate");
                None
            }
        }
    }

    /// Scroll so the item at `index` is positioned per `align`.
    ///
    /// Returns the new scroll offset, or `None` for an out-of-range index.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> Option<u64> {
        let start = self.offset_of(index)?;
        let size = u64::from(self.sizes[index]);
        let end = start + size;
        let viewport = u64::from(self.viewport);
        let current = self.scroll_offset;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(viewport),
            Align::Center => (start + size / 2).saturating_sub(viewport / 2),
            Align::Auto if start >= current && end <= current + viewport => current,
            Align::Auto if start < current => start,
            Align::Auto => end.saturating_sub(viewport),
        };
        self.set_scroll_offset(target);
        Some(self.scroll_offset)
    }

    /// Forget every measurement; all items fall back to the estimate.
    pub fn clear_measurements(&mut self) {
        self.cache.clear();
        let estimate = self.options.estimate_size;
        self.sizes.fill(estimate);
        self.rebuild_slots();
        self.clamp_scroll();
    }

    /// Measurement cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn start_of(&self, index: usize) -> u64 {
        u64::from(self.options.padding_start) + self.slots.sum_before(index)
    }

    fn rebuild_slots(&mut self) {
        let gap = self.options.gap;
        let slots: Vec<u32> = self.sizes.iter().map(|s| s.saturating_add(gap)).collect();
        self.slots = FenwickTree::from_values(&slots);
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
    }
}
