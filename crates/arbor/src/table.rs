//! Virtualized table rows with checkbox/radio selection.
//!
//! Windowing only kicks in for tables with a fixed body height and more than
//! [`VIRTUALIZE_THRESHOLD`] rows; smaller tables materialize every row and
//! the frame carries no spacers.
//!
//! Selecting every row of a very large dataset is split into a
//! [`SelectAllJob`] the caller steps between frames, so the selection grows
//! visibly instead of stalling one frame.

use std::fmt;

use arbor_core::{Key, KeySet, OwnedState, Ownership};
use arbor_virtual::{Align, SizeProbe, VirtualItem, Virtualizer, VirtualizerOptions};

use crate::frame::{RenderFrame, RenderedRow};

/// Row count above which a scrollable table is windowed.
pub const VIRTUALIZE_THRESHOLD: usize = 200;
/// Row count above which select-all runs as a [`SelectAllJob`].
pub const CHUNKED_SELECT_ALL_THRESHOLD: usize = 100_000;
/// Rows processed per [`SelectAllJob::step`].
pub const SELECT_ALL_CHUNK: usize = 20_000;
/// Default overscan of a windowed table.
pub const TABLE_OVERSCAN: usize = 8;

/// Density preset; fixes the estimated row height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowSize {
    Small,
    #[default]
    Middle,
    Large,
}

impl RowSize {
    /// Estimated row height.
    #[must_use]
    pub const fn height(self) -> u32 {
        match self {
            Self::Small => 28,
            Self::Middle => 40,
            Self::Large => 48,
        }
    }
}

/// Row selection control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowSelectionType {
    #[default]
    Checkbox,
    Radio,
}

/// Table configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    pub row_size: RowSize,
    /// Fixed body height; `None` lets the table grow with its rows.
    pub scroll_y: Option<u32>,
    /// Row selection control; `None` disables selection.
    pub selection: Option<RowSelectionType>,
    pub overscan: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_size: RowSize::Middle,
            scroll_y: None,
            selection: None,
            overscan: TABLE_OVERSCAN,
        }
    }
}

impl TableConfig {
    #[must_use]
    pub fn with_row_size(mut self, size: RowSize) -> Self {
        self.row_size = size;
        self
    }

    #[must_use]
    pub fn with_scroll_y(mut self, height: u32) -> Self {
        self.scroll_y = Some(height);
        self
    }

    #[must_use]
    pub fn with_selection(mut self, kind: RowSelectionType) -> Self {
        self.selection = Some(kind);
        self
    }

    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    fn virtualizer_options(&self) -> VirtualizerOptions {
        VirtualizerOptions::new()
            .with_estimate_size(self.row_size.height())
            .with_overscan(self.overscan)
    }
}

/// Maps a record and its index to a stable key.
pub type RowKeyFn<T> = Box<dyn Fn(&T, usize) -> Key>;
/// Whether a record's selection control is disabled.
pub type RowDisabledFn<T> = Box<dyn Fn(&T) -> bool>;
/// `(selected_keys, selected_rows)`.
pub type OnSelectionChange<T> = Box<dyn FnMut(&KeySet, &[&T])>;
/// `(record, selected, selected_rows)`.
pub type OnRowSelect<T> = Box<dyn FnMut(&T, bool, &[&T])>;
/// `(selected, selected_rows, change_rows)`.
pub type OnSelectAll<T> = Box<dyn FnMut(bool, &[&T], &[T])>;

/// Per-row state handed to the row callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRowState {
    pub key: Key,
    pub selected: bool,
    pub disabled: bool,
}

struct TableHooks<T> {
    on_change: Option<OnSelectionChange<T>>,
    on_select: Option<OnRowSelect<T>>,
    on_select_all: Option<OnSelectAll<T>>,
}

impl<T> Default for TableHooks<T> {
    fn default() -> Self {
        Self {
            on_change: None,
            on_select: None,
            on_select_all: None,
        }
    }
}

/// Windowed table body with row selection.
pub struct VirtualTable<T> {
    rows: Vec<T>,
    keys: Vec<Key>,
    config: TableConfig,
    row_key: Option<RowKeyFn<T>>,
    row_disabled: Option<RowDisabledFn<T>>,
    selection: OwnedState<KeySet>,
    hooks: TableHooks<T>,
    virt: Virtualizer<Key>,
    generation: u64,
}

impl<T> fmt::Debug for VirtualTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualTable")
            .field("rows", &self.rows.len())
            .field("config", &self.config)
            .field("has_row_key", &self.row_key.is_some())
            .field("has_row_disabled", &self.row_disabled.is_some())
            .field("selected", &self.selection.current().len())
            .field("has_on_change", &self.hooks.on_change.is_some())
            .field("has_on_select", &self.hooks.on_select.is_some())
            .field("has_on_select_all", &self.hooks.on_select_all.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}

impl<T> VirtualTable<T> {
    /// Create a table keyed by row index.
    pub fn new(rows: Vec<T>, config: TableConfig) -> Self {
        let virt = Virtualizer::new(config.virtualizer_options())
            .with_viewport(config.scroll_y.unwrap_or(0));
        let mut table = Self {
            rows,
            keys: Vec::new(),
            config,
            row_key: None,
            row_disabled: None,
            selection: OwnedState::new(KeySet::new()),
            hooks: TableHooks::default(),
            virt,
            generation: 0,
        };
        table.rekey();
        table
    }

    #[must_use]
    pub fn with_row_key(mut self, key: impl Fn(&T, usize) -> Key + 'static) -> Self {
        self.row_key = Some(Box::new(key));
        self.rekey();
        self
    }

    #[must_use]
    pub fn with_row_disabled(mut self, disabled: impl Fn(&T) -> bool + 'static) -> Self {
        self.row_disabled = Some(Box::new(disabled));
        self
    }

    #[must_use]
    pub fn with_default_selected_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.selection.reset(keys.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_on_selection_change(
        mut self,
        hook: impl FnMut(&KeySet, &[&T]) + 'static,
    ) -> Self {
        self.hooks.on_change = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn with_on_select(mut self, hook: impl FnMut(&T, bool, &[&T]) + 'static) -> Self {
        self.hooks.on_select = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn with_on_select_all(mut self, hook: impl FnMut(bool, &[&T], &[T]) + 'static) -> Self {
        self.hooks.on_select_all = Some(Box::new(hook));
        self
    }

    // ── Data ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub fn virtualizer(&self) -> &Virtualizer<Key> {
        &self.virt
    }

    /// Replace the dataset. Cancels any running [`SelectAllJob`].
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.generation = self.generation.wrapping_add(1);
        self.rekey();
    }

    /// Key of the row at `index`.
    #[must_use]
    pub fn row_key(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    /// Whether the selection control of the row at `index` is disabled.
    #[must_use]
    pub fn is_row_disabled(&self, index: usize) -> bool {
        match (self.rows.get(index), &self.row_disabled) {
            (Some(record), Some(disabled)) => disabled(record),
            _ => false,
        }
    }

    /// Whether rows are windowed.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.config.scroll_y.is_some() && self.rows.len() > VIRTUALIZE_THRESHOLD
    }

    // ── Selection ───────────────────────────────────────────────────────

    #[must_use]
    pub fn selected_keys(&self) -> &KeySet {
        self.selection.current()
    }

    #[must_use]
    pub fn selection_ownership(&self) -> Ownership {
        self.selection.ownership()
    }

    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.keys
            .get(index)
            .is_some_and(|key| self.selection.current().contains(key))
    }

    /// Selected records in data order.
    #[must_use]
    pub fn selected_rows(&self) -> Vec<&T> {
        rows_in(&self.rows, &self.keys, self.selection.current())
    }

    /// Header checkbox state: every row selected.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        !self.rows.is_empty() && self.selection.current().len() == self.rows.len()
    }

    /// Apply this render's controlled selection (`None` = uncontrolled).
    pub fn sync_selected(&mut self, controlled: Option<KeySet>) {
        self.selection.sync(controlled);
    }

    /// Check or uncheck the row at `index`; returns the proposed selection.
    ///
    /// Ignored when selection is off, the index is out of range or the row
    /// is disabled.
    pub fn select_row(&mut self, index: usize, checked: bool) -> Option<KeySet> {
        let kind = self.config.selection?;
        let record = self.rows.get(index)?;
        if self.row_disabled.as_ref().is_some_and(|disabled| disabled(record)) {
            return None;
        }
        let key = self.keys[index].clone();

        let next = match kind {
            RowSelectionType::Radio if checked => KeySet::from([key]),
            RowSelectionType::Radio => KeySet::new(),
            RowSelectionType::Checkbox => {
                let mut next = self.selection.current().clone();
                if checked {
                    next.insert(key);
                } else {
                    next.remove(&key);
                }
                next
            }
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(index, checked, count = next.len(), "table select_row");

        let selected = rows_in(&self.rows, &self.keys, &next);
        let on_change = &mut self.hooks.on_change;
        self.selection.propose(next.clone(), |keys| {
            if let Some(hook) = on_change.as_mut() {
                hook(keys, &selected);
            }
        });
        if let Some(hook) = self.hooks.on_select.as_mut() {
            hook(record, checked, &selected);
        }
        Some(next)
    }

    /// Check or uncheck every row.
    ///
    /// Checking more than [`CHUNKED_SELECT_ALL_THRESHOLD`] rows returns a job
    /// the caller must step to completion; everything else applies at once.
    pub fn select_all(&mut self, checked: bool) -> SelectAll {
        if checked && self.rows.len() > CHUNKED_SELECT_ALL_THRESHOLD {
            #[cfg(feature = "tracing")]
            tracing::debug!(rows = self.rows.len(), "table select_all chunked");

            return SelectAll::Chunked(SelectAllJob {
                generation: self.generation,
                next_index: 0,
                total: self.rows.len(),
                keys: KeySet::new(),
                finished: false,
            });
        }

        let keys: KeySet = if checked {
            self.keys.iter().cloned().collect()
        } else {
            KeySet::new()
        };
        self.finish_select_all(checked, keys.clone());
        SelectAll::Immediate(keys)
    }

    fn finish_select_all(&mut self, checked: bool, keys: KeySet) {
        let rows: Vec<&T> = if checked {
            self.rows.iter().collect()
        } else {
            Vec::new()
        };
        let on_change = &mut self.hooks.on_change;
        self.selection.propose(keys, |keys| {
            if let Some(hook) = on_change.as_mut() {
                hook(keys, &rows);
            }
        });
        if let Some(hook) = self.hooks.on_select_all.as_mut() {
            hook(checked, &rows, &self.rows);
        }
    }

    // ── Scrolling and measurement ───────────────────────────────────────

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

    pub fn measure_row(&mut self, index: usize, size: u32) -> i64 {
        self.virt.measure(index, size)
    }

    pub fn measure_row_element<P>(
        &mut self,
        index: usize,
        handle: &P::Handle,
        probe: &P,
    ) -> Option<i64>
    where
        P: SizeProbe + ?Sized,
    {
        self.virt.measure_element(index, handle, probe)
    }

    // ── Rendering ───────────────────────────────────────────────────────

    /// Materialize the table body.
    pub fn render<R>(
        &self,
        mut render_row: impl FnMut(&T, usize, &TableRowState) -> R,
    ) -> RenderFrame<R> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "table.render",
            rows = self.rows.len(),
            windowed = self.is_virtual()
        )
        .entered();

        let items: Vec<VirtualItem<Key>> = if self.is_virtual() {
            self.virt.virtual_items()
        } else {
            (0..self.rows.len()).filter_map(|i| self.virt.item(i)).collect()
        };

        let rows = items
            .into_iter()
            .filter_map(|item| {
                let record = self.rows.get(item.index)?;
                let state = TableRowState {
                    key: item.key.clone(),
                    selected: self.selection.current().contains(&item.key),
                    disabled: self.is_row_disabled(item.index),
                };
                let output = render_row(record, item.index, &state);
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
        self.keys = match &self.row_key {
            Some(key) => self
                .rows
                .iter()
                .enumerate()
                .map(|(i, record)| key(record, i))
                .collect(),
            None => (0..self.rows.len()).map(|i| Key::Str(i.to_string())).collect(),
        };
        self.virt.set_items(self.keys.iter().cloned());
    }
}

fn rows_in<'a, T>(rows: &'a [T], keys: &[Key], selected: &KeySet) -> Vec<&'a T> {
    if selected.is_empty() {
        return Vec::new();
    }
    rows.iter()
        .zip(keys)
        .filter(|(_, key)| selected.contains(*key))
        .map(|(record, _)| record)
        .collect()
}

/// Outcome of [`VirtualTable::select_all`].
#[derive(Debug)]
pub enum SelectAll {
    /// Applied at once; the proposed selection.
    Immediate(KeySet),
    /// Must be stepped to completion.
    Chunked(SelectAllJob),
}

/// Result of one [`SelectAllJob::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectAllStep {
    /// More rows remain.
    Progress { processed: usize, total: usize },
    /// Every row is selected; hooks have fired.
    Done(KeySet),
    /// The dataset changed underneath the job.
    Cancelled,
}

/// Cooperative select-all over a very large table.
///
/// Each step adds up to [`SELECT_ALL_CHUNK`] keys and publishes the partial
/// selection without notifying; a controlled table only sees the final
/// proposal. The final step proposes the full selection,
/// then fires `on_selection_change` and `on_select_all`.
#[derive(Debug, Clone)]
pub struct SelectAllJob {
    generation: u64,
    next_index: usize,
    total: usize,
    keys: KeySet,
    finished: bool,
}

impl SelectAllJob {
    /// `(processed, total)` rows.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.next_index, self.total)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Process the next chunk of `table`.
    pub fn step<T>(&mut self, table: &mut VirtualTable<T>) -> SelectAllStep {
        if table.generation != self.generation || table.rows.len() != self.total {
            #[cfg(feature = "tracing")]
            tracing::debug!(processed = self.next_index, "select_all job cancelled");
            return SelectAllStep::Cancelled;
        }
        if self.finished {
            return SelectAllStep::Done(self.keys.clone());
        }

        let end = (self.next_index + SELECT_ALL_CHUNK).min(self.total);
        self.keys.extend(table.keys[self.next_index..end].iter().cloned());
        self.next_index = end;

        #[cfg(feature = "tracing")]
        tracing::trace!(processed = end, total = self.total, "select_all step");

        if end < self.total {
            if !table.selection.is_controlled() {
                table.selection.reset(self.keys.clone());
            }
            return SelectAllStep::Progress {
                processed: end,
                total: self.total,
            };
        }

        self.finished = true;
        table.finish_select_all(true, self.keys.clone());
        SelectAllStep::Done(self.keys.clone())
    }

    /// Step until the job completes or is cancelled.
    pub fn run<T>(&mut self, table: &mut VirtualTable<T>) -> SelectAllStep {
        loop {
            match self.step(table) {
                SelectAllStep::Progress { .. } => continue,
                done => return done,
            }
        }
    }
}
