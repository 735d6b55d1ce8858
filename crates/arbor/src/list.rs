//! Virtualized flat list.
//!
//! The item gap is folded into every slot: both the estimate and each
//! measurement are reported to the virtualizer as `size + gap`, so the gap
//! sits below each item.

use std::fmt;

use arbor_core::Key;
use arbor_virtual::{Align, SizeProbe, Virtualizer, VirtualizerOptions};

use crate::frame::{RenderFrame, RenderedRow};

/// Default item height of a list.
pub const LIST_ESTIMATE_SIZE: u32 = 40;
/// Default viewport height of a list.
pub const LIST_CONTAINER_HEIGHT: u32 = 500;
/// Default overscan of a list.
pub const LIST_OVERSCAN: usize = 8;

/// Maps an item and its index to a stable key.
pub type ItemKeyFn<T> = Box<dyn Fn(&T, usize) -> Key>;

/// List configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListConfig {
    pub estimated_item_size: u32,
    pub container_height: u32,
    /// Space below every item.
    pub item_gap: u32,
    pub overscan: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            estimated_item_size: LIST_ESTIMATE_SIZE,
            container_height: LIST_CONTAINER_HEIGHT,
            item_gap: 0,
            overscan: LIST_OVERSCAN,
        }
    }
}

impl ListConfig {
    #[must_use]
    pub fn with_estimated_item_size(mut self, size: u32) -> Self {
        self.estimated_item_size = size;
        self
    }

    #[must_use]
    pub fn with_container_height(mut self, height: u32) -> Self {
        self.container_height = height;
        self
    }

    #[must_use]
    pub fn with_item_gap(mut self, gap: u32) -> Self {
        self.item_gap = gap;
        self
    }

    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    fn virtualizer_options(&self) -> VirtualizerOptions {
        VirtualizerOptions::new()
            .with_estimate_size(self.estimated_item_size.saturating_add(self.item_gap))
            .with_overscan(self.overscan)
    }
}

/// Windowed list over a flat dataset.
pub struct VirtualList<T> {
    items: Vec<T>,
    config: ListConfig,
    item_key: Option<ItemKeyFn<T>>,
    virt: Virtualizer<Key>,
}

impl<T: fmt::Debug> fmt::Debug for VirtualList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualList")
            .field("items", &self.items.len())
            .field("config", &self.config)
            .field("has_item_key", &self.item_key.is_some())
            .field("virt", &self.virt)
            .finish()
    }
}

impl<T> VirtualList<T> {
    /// Create a list keyed by index.
    pub fn new(items: Vec<T>, config: ListConfig) -> Self {
        let virt =
            Virtualizer::new(config.virtualizer_options()).with_viewport(config.container_height);
        let mut list = Self {
            items,
            config,
            item_key: None,
            virt,
        };
        list.rekey();
        list
    }

    /// Derive keys from items so measurements follow reordered data.
    #[must_use]
    pub fn with_item_key(mut self, key: impl Fn(&T, usize) -> Key + 'static) -> Self {
        self.item_key = Some(Box::new(key));
        self.rekey();
        self
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    #[must_use]
    pub fn virtualizer(&self) -> &Virtualizer<Key> {
        &self.virt
    }

    /// Key of the item at `index`.
    #[must_use]
    pub fn key_of(&self, index: usize) -> Option<&Key> {
        self.virt.keys().get(index)
    }

    /// Replace the dataset.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.rekey();
    }

    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.virt.total_size()
    }

    #[must_use]
    pub fn scroll_offset(&self) -> u64 {
        self.virt.scroll_offset()
    }

    pub fn scroll_to(&mut self, offset: u64) {
        self.virt.set_scroll_offset(offset);
    }

    pub fn scroll_by(&mut self, delta: i64) {
        self.virt.scroll_by(delta);
    }

    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> Option<u64> {
        self.virt.scroll_to_index(index, align)
    }

    pub fn set_container_height(&mut self, height: u32) {
        self.config.container_height = height;
        self.virt.set_viewport(height);
    }

    /// Record the rendered height of the item at `index` (gap excluded).
    pub fn measure_item(&mut self, index: usize, size: u32) -> i64 {
        self.virt.measure(index, size.saturating_add(self.config.item_gap))
    }

    /// Measure a rendered item through `probe`.
    pub fn measure_item_element<P>(
        &mut self,
        index: usize,
        handle: &P::Handle,
        probe: &P,
    ) -> Option<i64>
    where
        P: SizeProbe + ?Sized,
    {
        let size = probe.measure(handle)?;
        Some(self.measure_item(index, size))
    }

    /// Materialize the items in and around the viewport.
    pub fn render<R>(&self, mut render_item: impl FnMut(&T, usize) -> R) -> RenderFrame<R> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("list.render", items = self.items.len()).entered();

        let rows = self
            .virt
            .virtual_items()
            .into_iter()
            .filter_map(|item| {
                let value = self.items.get(item.index)?;
                let output = render_item(value, item.index);
                Some(RenderedRow { item, output })
            })
            .collect();

        RenderFrame {
            total_size: self.virt.total_size(),
            scroll_offset: self.virt.scroll_offset(),
            rows,
        }
    }

    fn rekey(&mut self) {
        let keys: Vec<Key> = match &self.item_key {
            Some(key) => self
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| key(item, i))
                .collect(),
            None => (0..self.items.len()).map(Key::from).collect(),
        };
        self.virt.set_items(keys);
    }
}
