//! Output of a render pass.

use arbor_core::Key;
use arbor_virtual::VirtualItem;

/// One materialized row: its geometry and whatever the row callback built.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow<R> {
    /// Position and size of the row.
    pub item: VirtualItem<Key>,
    /// Value returned by the row callback.
    pub output: R,
}

/// Rows materialized for the current viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame<R> {
    /// Extent of the full scroll surface.
    pub total_size: u64,
    /// Scroll offset the frame was computed at.
    pub scroll_offset: u64,
    /// Materialized rows in index order.
    pub rows: Vec<RenderedRow<R>>,
}

impl<R> RenderFrame<R> {
    /// Frame with nothing to draw.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total_size: 0,
            scroll_offset: 0,
            rows: Vec::new(),
        }
    }

    /// Number of materialized rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing was materialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Spacer before the first materialized row.
    #[must_use]
    pub fn padding_top(&self) -> u64 {
        self.rows.first().map_or(0, |row| row.item.start)
    }

    /// Spacer after the last materialized row.
    #[must_use]
    pub fn padding_bottom(&self) -> u64 {
        self.rows
            .last()
            .map_or(0, |row| self.total_size.saturating_sub(row.item.end()))
    }

    /// Row callback outputs in order.
    pub fn outputs(&self) -> impl Iterator<Item = &R> {
        self.rows.iter().map(|row| &row.output)
    }

    /// Consume the frame, keeping only the outputs.
    #[must_use]
    pub fn into_outputs(self) -> Vec<R> {
        self.rows.into_iter().map(|row| row.output).collect()
    }
}
