#![forbid(unsafe_code)]

//! Virtualized tree view.
//!
//! [`Tree`] wires the core state machines to a [`Virtualizer`]: the flat row
//! list is recomputed whenever the expansion set or the data changes, and the
//! virtualizer is re-keyed so measured heights follow their rows.
//!
//! # Example
//!
//! ```
//! use arbor::{ExpandPolicy, Tree, TreeConfig, TreeNode};
//!
//! let roots = vec![
//!     TreeNode::new("src").child(TreeNode::new("main.rs")),
//!     TreeNode::new("README.md"),
//! ];
//! let mut tree = Tree::new(
//!     roots,
//!     TreeConfig::default().with_policy(ExpandPolicy::new().with_auto_expand_root(false)),
//! );
//! assert_eq!(tree.rows().len(), 2);
//!
//! tree.toggle_row(0);
//! let frame = tree.render(|node, ctx| format!("{}:{}", ctx.level, node.title()));
//! assert_eq!(frame.into_outputs(), vec!["0:src", "1:main.rs", "0:README.md"]);
//! ```

use arbor_core::{
    ExpandPolicy, ExpansionState, FlatRow, Key, KeySet, Ownership, RowFlags, SelectInfo,
    SelectionMode, SelectionState, TreeNode, flatten, validate_unique_keys,
};
use arbor_virtual::{
    Align, DEFAULT_ESTIMATE_SIZE, DEFAULT_OVERSCAN, SizeProbe, Virtualizer, VirtualizerOptions,
};

use crate::frame::{RenderFrame, RenderedRow};

/// Default viewport height of a tree.
pub const DEFAULT_CONTAINER_HEIGHT: u32 = 360;
/// Default indentation per level.
pub const DEFAULT_INDENT: u32 = 16;
/// Leading padding of every row, added to the level indentation.
pub const ROW_BASE_PADDING: u32 = 12;

/// What a click on a row title does to its expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandAction {
    /// Only the toggle affordance expands.
    #[default]
    None,
    /// A successful select also toggles a branch.
    Click,
    /// A double click toggles a branch.
    DoubleClick,
}

/// Tree configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    /// Initial expansion and toggle visibility.
    pub policy: ExpandPolicy,
    /// Single or multiple selection.
    pub selection_mode: SelectionMode,
    /// Whether rows accept select intents at all.
    pub selectable: bool,
    /// Initial uncontrolled selection.
    pub default_selected_keys: Vec<Key>,
    /// Viewport height.
    pub container_height: u32,
    /// Height assumed for unmeasured rows.
    pub estimated_item_size: u32,
    /// Extra rows materialized on each side of the viewport.
    pub overscan: usize,
    /// Indentation per level.
    pub indent: u32,
    /// Click behaviour of row titles.
    pub expand_action: ExpandAction,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            policy: ExpandPolicy::default(),
            selection_mode: SelectionMode::Single,
            selectable: true,
            default_selected_keys: Vec::new(),
            container_height: DEFAULT_CONTAINER_HEIGHT,
            estimated_item_size: DEFAULT_ESTIMATE_SIZE,
            overscan: DEFAULT_OVERSCAN,
            indent: DEFAULT_INDENT,
            expand_action: ExpandAction::None,
        }
    }
}

impl TreeConfig {
    /// File-browser preset: clicking a folder selects and toggles it.
    #[must_use]
    pub fn directory() -> Self {
        Self {
            expand_action: ExpandAction::Click,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ExpandPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    #[must_use]
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    #[must_use]
    pub fn with_default_selected_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.default_selected_keys = keys.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_container_height(mut self, height: u32) -> Self {
        self.container_height = height;
        self
    }

    #[must_use]
    pub fn with_estimated_item_size(mut self, size: u32) -> Self {
        self.estimated_item_size = size;
        self
    }

    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: u32) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_expand_action(mut self, action: ExpandAction) -> Self {
        self.expand_action = action;
        self
    }

    fn virtualizer_options(&self) -> VirtualizerOptions {
        VirtualizerOptions::new()
            .with_estimate_size(self.estimated_item_size)
            .with_overscan(self.overscan)
    }
}

/// Per-row state handed to the row callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContext {
    /// Resolved key of the row.
    pub key: Key,
    /// Depth from the root.
    pub level: usize,
    /// Leading padding for this level.
    pub indent: u32,
    /// Leaf, disabled, expanded and selected bits.
    pub flags: RowFlags,
    /// Whether to draw the expand/collapse affordance.
    pub show_toggle: bool,
}

impl RowContext {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.flags.contains(RowFlags::LEAF)
    }

    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.flags.contains(RowFlags::EXPANDED)
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.flags.contains(RowFlags::SELECTED)
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.flags.contains(RowFlags::DISABLED)
    }
}

/// Result of a click on a row title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowClick {
    /// Key of the clicked row.
    pub key: Key,
    /// New membership of the key, `None` when the select was swallowed.
    pub selected: Option<bool>,
    /// Proposed expansion set when the click also toggled the row.
    pub expanded_keys: Option<KeySet>,
}

/// Virtualized, expandable, selectable tree.
#[derive(Debug)]
pub struct Tree<T> {
    roots: Vec<TreeNode<T>>,
    config: TreeConfig,
    expansion: ExpansionState,
    selection: SelectionState<T>,
    rows: Vec<FlatRow>,
    rows_revision: u64,
    rows_stale: bool,
    virt: Virtualizer<Key>,
}

impl<T> Tree<T> {
    /// Build a tree, seeding uncontrolled state from `config`.
    pub fn new(roots: Vec<TreeNode<T>>, config: TreeConfig) -> Self {
        let expansion = ExpansionState::from_policy(&roots, &config.policy);
        let selection = SelectionState::new(config.selection_mode)
            .with_selectable(config.selectable)
            .with_default_selected(config.default_selected_keys.iter().cloned());
        let virt =
            Virtualizer::new(config.virtualizer_options()).with_viewport(config.container_height);
        let mut tree = Self {
            roots,
            config,
            expansion,
            selection,
            rows: Vec::new(),
            rows_revision: 0,
            rows_stale: true,
            virt,
        };
        tree.refresh();
        tree
    }

    /// Like [`Tree::new`] but rejects datasets with colliding keys.
    pub fn try_new(roots: Vec<TreeNode<T>>, config: TreeConfig) -> crate::Result<Self> {
        validate_unique_keys(&roots)?;
        Ok(Self::new(roots, config))
    }

    /// Register the expansion listener.
    ///
    /// A tree that starts with the toggle hidden and uncontrolled expansion
    /// is fully expanded on construction; the listener receives that set once
    /// on registration.
    #[must_use]
    pub fn with_on_expanded_keys_change(
        mut self,
        mut listener: impl FnMut(&KeySet) + 'static,
    ) -> Self {
        if !self.config.policy.show_toggle_icon
            && self.expansion.ownership() == Ownership::Uncontrolled
        {
            listener(self.expansion.keys());
        }
        self.expansion.set_listener(Some(Box::new(listener)));
        self
    }

    /// Register the selection listener.
    #[must_use]
    pub fn with_on_select(
        mut self,
        listener: impl for<'a> FnMut(&KeySet, &SelectInfo<'a, T>) + 'static,
    ) -> Self {
        self.selection.set_listener(Some(Box::new(listener)));
        self
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[must_use]
    pub fn roots(&self) -> &[TreeNode<T>] {
        &self.roots
    }

    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Visible rows in display order.
    #[must_use]
    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    /// Display index of the row with `key`, if visible.
    #[must_use]
    pub fn row_index(&self, key: &Key) -> Option<usize> {
        self.rows.iter().position(|row| &row.key == key)
    }

    /// Node behind the visible row at `index`.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&TreeNode<T>> {
        self.rows.get(index)?.node(&self.roots)
    }

    #[must_use]
    pub fn expanded_keys(&self) -> &KeySet {
        self.expansion.keys()
    }

    #[must_use]
    pub fn selected_keys(&self) -> &KeySet {
        self.selection.keys()
    }

    #[must_use]
    pub fn expansion_ownership(&self) -> Ownership {
        self.expansion.ownership()
    }

    #[must_use]
    pub fn selection_ownership(&self) -> Ownership {
        self.selection.ownership()
    }

    #[must_use]
    pub fn virtualizer(&self) -> &Virtualizer<Key> {
        &self.virt
    }

    /// Extent of the whole scroll surface.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.virt.total_size()
    }

    /// Leading padding of a row at `level`.
    #[must_use]
    pub fn row_indent(&self, level: usize) -> u32 {
        u32::try_from(level)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.config.indent)
            .saturating_add(ROW_BASE_PADDING)
    }

    /// Full per-row state of the visible row at `index`.
    #[must_use]
    pub fn row_context(&self, index: usize) -> Option<RowContext> {
        let row = self.rows.get(index)?;
        let mut flags = row.flags();
        flags.set(RowFlags::EXPANDED, row.is_expanded(self.expansion.keys()));
        flags.set(RowFlags::SELECTED, self.selection.is_selected(&row.key));
        Some(RowContext {
            key: row.key.clone(),
            level: row.level,
            indent: self.row_indent(row.level),
            flags,
            show_toggle: !row.is_leaf && self.config.policy.show_toggle_icon,
        })
    }

    // ── Data and controlled values ──────────────────────────────────────

    /// Replace the dataset. Measured heights stay attached to surviving keys.
    pub fn set_data(&mut self, roots: Vec<TreeNode<T>>) {
        self.roots = roots;
        self.rows_stale = true;
        if !self.config.policy.show_toggle_icon
            && self.expansion.ownership() == Ownership::Uncontrolled
        {
            self.expansion.expand_all(&self.roots);
        }
        self.refresh();
    }

    /// Replace the dataset and re-seed uncontrolled expansion from `policy`
    /// without notifying. The configured policy is left as is.
    pub fn reset_data(&mut self, roots: Vec<TreeNode<T>>, policy: &ExpandPolicy) {
        self.expansion.reinitialize(&roots, policy);
        self.roots = roots;
        self.rows_stale = true;
        self.refresh();
    }

    /// Replace the dataset and overwrite uncontrolled expansion with
    /// `expanded` without notifying.
    pub fn restore_data(&mut self, roots: Vec<TreeNode<T>>, expanded: KeySet) {
        self.expansion.restore(expanded);
        self.roots = roots;
        self.rows_stale = true;
        self.refresh();
    }

    /// Apply this render's controlled expansion (`None` = uncontrolled).
    pub fn sync_expanded(&mut self, controlled: Option<KeySet>) {
        self.expansion.sync(controlled);
        self.refresh();
    }

    /// Apply this render's controlled selection (`None` = uncontrolled).
    pub fn sync_selected(&mut self, controlled: Option<KeySet>) {
        self.selection.sync(controlled);
    }

    /// Show or hide the toggle affordance.
    ///
    /// Hiding it on an uncontrolled tree expands every branch and notifies.
    pub fn set_show_toggle_icon(&mut self, show: bool) {
        if self.config.policy.show_toggle_icon == show {
            return;
        }
        self.config.policy.show_toggle_icon = show;
        if !show && self.expansion.ownership() == Ownership::Uncontrolled {
            self.expansion.expand_all(&self.roots);
            self.refresh();
        }
    }

    // ── Intents ─────────────────────────────────────────────────────────

    /// Flip `key` in the expansion set; returns the proposed set.
    pub fn toggle(&mut self, key: &Key) -> KeySet {
        let next = self.expansion.toggle(key);
        self.refresh();
        next
    }

    /// Toggle the visible row at `index`. Leaves and disabled rows are ignored.
    pub fn toggle_row(&mut self, index: usize) -> Option<KeySet> {
        let row = self.rows.get(index)?;
        if row.is_leaf || row.disabled {
            return None;
        }
        let key = row.key.clone();
        Some(self.toggle(&key))
    }

    pub fn expand_all(&mut self) -> KeySet {
        let next = self.expansion.expand_all(&self.roots);
        self.refresh();
        next
    }

    pub fn collapse_all(&mut self) -> KeySet {
        let next = self.expansion.collapse_all();
        self.refresh();
        next
    }

    /// Select the visible row at `index`.
    pub fn select_row(&mut self, index: usize) -> Option<SelectInfo<'_, T>> {
        let row = self.rows.get(index)?;
        let node = row.node(&self.roots)?;
        self.selection.select(&row.key, node)
    }

    /// Click on a row title: select, then toggle per [`ExpandAction::Click`].
    pub fn click_row(&mut self, index: usize) -> Option<RowClick> {
        let row = self.rows.get(index)?;
        let node = row.node(&self.roots)?;
        let key = row.key.clone();
        let toggles = !node.is_leaf() && !node.is_disabled();
        let selected = self.selection.select(&key, node).map(|info| info.selected);
        let expanded_keys = match (selected, self.config.expand_action) {
            (Some(_), ExpandAction::Click) if toggles => Some(self.toggle(&key)),
            _ => None,
        };
        Some(RowClick {
            key,
            selected,
            expanded_keys,
        })
    }

    /// Double click on a row title; toggles only under [`ExpandAction::DoubleClick`].
    pub fn double_click_row(&mut self, index: usize) -> Option<KeySet> {
        if self.config.expand_action != ExpandAction::DoubleClick {
            return None;
        }
        self.toggle_row(index)
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

    /// Scroll so the row with `key` is in view.
    pub fn scroll_to_key(&mut self, key: &Key, align: Align) -> Option<u64> {
        let index = self.row_index(key)?;
        self.virt.scroll_to_index(index, align)
    }

    /// Resize the viewport.
    pub fn set_container_height(&mut self, height: u32) {
        self.config.container_height = height;
        self.virt.set_viewport(height);
    }

    /// Record the measured height of the row at `index`; returns the scroll
    /// adjustment applied to keep the view anchored.
    pub fn measure_row(&mut self, index: usize, size: u32) -> i64 {
        self.virt.measure(index, size)
    }

    /// Measure a rendered row through `probe`.
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

    /// Materialize the rows in and around the viewport.
    pub fn render<R>(
        &self,
        mut render_row: impl FnMut(&TreeNode<T>, &RowContext) -> R,
    ) -> RenderFrame<R> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "tree.render",
            rows = self.rows.len(),
            offset = self.virt.scroll_offset()
        )
        .entered();

        let rows = self
            .virt
            .virtual_items()
            .into_iter()
            .filter_map(|item| {
                let context = self.row_context(item.index)?;
                let node = self.node(item.index)?;
                let output = render_row(node, &context);
                Some(RenderedRow { item, output })
            })
            .collect();

        RenderFrame {
            total_size: self.virt.total_size(),
            scroll_offset: self.virt.scroll_offset(),
            rows,
        }
    }

    fn refresh(&mut self) {
        let revision = self.expansion.revision();
        if !self.rows_stale && revision == self.rows_revision {
            return;
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("tree.refresh", revision).entered();

        self.rows = flatten(&self.roots, self.expansion.keys());
        self.rows_revision = revision;
        self.rows_stale = false;
        self.virt.set_items(self.rows.iter().map(|row| row.key.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use arbor_core::KeyError;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn folders() -> Vec<TreeNode<&'static str>> {
        vec![
            TreeNode::new("docs")
                .with_key("docs")
                .child(TreeNode::new("a.md"))
                .child(TreeNode::new("b.md")),
            TreeNode::new("locked")
                .with_key("locked")
                .disabled(true)
                .child(TreeNode::new("secret")),
            TreeNode::new("notes.txt").with_key("notes"),
        ]
    }

    fn collapsed() -> TreeConfig {
        TreeConfig::default().with_policy(ExpandPolicy::new().with_auto_expand_root(false))
    }

    #[test]
    fn auto_expand_root_opens_first_level() {
        let tree = Tree::new(folders(), TreeConfig::default());
        let titles: Vec<_> = (0..tree.rows().len())
            .filter_map(|i| tree.node(i).map(|n| *n.title()))
            .collect();
        assert_eq!(titles, ["docs", "a.md", "b.md", "locked", "secret", "notes.txt"]);
    }

    #[test]
    fn toggle_row_ignores_leaves_and_disabled() {
        let mut tree = Tree::new(folders(), collapsed());
        assert_eq!(tree.rows().len(), 3);
        assert!(tree.toggle_row(2).is_none());
        assert!(tree.toggle_row(1).is_none());
        assert!(tree.toggle_row(9).is_none());
        let next = tree.toggle_row(0);
        assert_eq!(next, Some(KeySet::from([Key::from("docs")])));
        assert_eq!(tree.rows().len(), 5);
        assert_eq!(tree.virtualizer().len(), 5);
    }

    #[test]
    fn controlled_expansion_waits_for_sync() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut tree = Tree::new(folders(), collapsed())
            .with_on_expanded_keys_change(move |keys| sink.borrow_mut().push(keys.clone()));
        tree.sync_expanded(Some(KeySet::new()));

        tree.toggle_row(0);
        assert_eq!(tree.rows().len(), 3, "controlled rows follow the owner");
        assert_eq!(seen.borrow().len(), 1);

        let proposed = seen.borrow()[0].clone();
        tree.sync_expanded(Some(proposed));
        assert_eq!(tree.rows().len(), 5);
    }

    #[test]
    fn click_in_directory_mode_selects_then_toggles() {
        let config =
            TreeConfig::directory().with_policy(ExpandPolicy::new().with_auto_expand_root(false));
        let mut tree = Tree::new(folders(), config);
        let click = tree.click_row(0).unwrap();
        assert_eq!(click.selected, Some(true));
        assert!(click.expanded_keys.is_some());
        assert!(tree.selected_keys().contains(&Key::from("docs")));
        assert_eq!(tree.rows().len(), 5);

        // Leaves select without toggling.
        let leaf = tree.click_row(1).unwrap();
        assert_eq!(leaf.selected, Some(true));
        assert!(leaf.expanded_keys.is_none());

        // Disabled branches neither select nor toggle.
        let locked = tree.row_index(&Key::from("locked")).unwrap();
        let click = tree.click_row(locked).unwrap();
        assert_eq!(click.selected, None);
        assert!(click.expanded_keys.is_none());
    }

    #[test]
    fn click_without_expand_action_only_selects() {
        let mut tree = Tree::new(folders(), collapsed());
        let click = tree.click_row(0).unwrap();
        assert_eq!(click.selected, Some(true));
        assert!(click.expanded_keys.is_none());
        assert_eq!(tree.rows().len(), 3);
    }

    #[test]
    fn double_click_toggles_only_in_double_click_mode() {
        let mut tree = Tree::new(folders(), collapsed());
        assert!(tree.double_click_row(0).is_none());

        let mut tree = Tree::new(
            folders(),
            collapsed().with_expand_action(ExpandAction::DoubleClick),
        );
        assert!(tree.double_click_row(0).is_some());
        assert_eq!(tree.rows().len(), 5);
        assert!(tree.selected_keys().is_empty());
        assert!(tree.double_click_row(1).is_none(), "leaf");
    }

    #[test]
    fn hiding_toggle_expands_everything_and_notifies() {
        let seen = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&seen);
        let mut tree = Tree::new(folders(), collapsed())
            .with_on_expanded_keys_change(move |_| *sink.borrow_mut() += 1);
        tree.set_show_toggle_icon(false);
        assert_eq!(tree.rows().len(), 6);
        assert_eq!(*seen.borrow(), 1);

        // Re-applies to fresh data.
        tree.set_data(vec![TreeNode::new("x").child(TreeNode::new("y"))]);
        assert_eq!(tree.rows().len(), 2);
        assert_eq!(*seen.borrow(), 2);
        assert!(!tree.row_context(0).unwrap().show_toggle);
    }

    #[test]
    fn hidden_toggle_reports_initial_expansion() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let tree = Tree::new(
            folders(),
            TreeConfig::default().with_policy(ExpandPolicy::new().with_show_toggle_icon(false)),
        )
        .with_on_expanded_keys_change(move |keys| sink.borrow_mut().push(keys.clone()));

        assert_eq!(tree.rows().len(), 6);
        let expected = KeySet::from([Key::from("docs"), Key::from("locked")]);
        assert_eq!(*seen.borrow(), vec![expected]);
    }

    #[test]
    fn reset_and_restore_data_keep_measurements() {
        let mut tree = Tree::new(folders(), collapsed());
        tree.toggle_row(0);
        tree.measure_row(0, 90);

        tree.reset_data(folders(), &ExpandPolicy::new().with_default_expand_all(true));
        assert_eq!(tree.rows().len(), 6);
        assert_eq!(tree.virtualizer().size_of(0), Some(90));

        tree.restore_data(folders(), KeySet::from([Key::from("docs")]));
        assert_eq!(tree.rows().len(), 5);
        assert_eq!(tree.virtualizer().size_of(0), Some(90));
    }

    #[test]
    fn render_reports_context() {
        let mut tree = Tree::new(folders(), TreeConfig::default());
        tree.select_row(1);
        let frame = tree.render(|node, ctx| (*node.title(), ctx.clone()));
        assert_eq!(frame.len(), 6);
        let (title, docs) = &frame.rows[0].output;
        assert_eq!(*title, "docs");
        assert!(docs.is_expanded() && !docs.is_leaf() && docs.show_toggle);
        assert_eq!(docs.indent, 12);
        let (_, leaf) = &frame.rows[1].output;
        assert!(leaf.is_selected() && leaf.is_leaf());
        assert_eq!(leaf.indent, 28);
        let (_, locked) = &frame.rows[3].output;
        assert!(locked.is_disabled());
        assert_eq!(frame.total_size, 6 * 40);
    }

    #[test]
    fn measurements_follow_keys_across_toggles() {
        let mut tree = Tree::new(folders(), collapsed());
        tree.measure_row(2, 90);
        tree.toggle_row(0);
        let notes = tree.row_index(&Key::from("notes")).unwrap();
        assert_eq!(tree.virtualizer().size_of(notes), Some(90));
        assert_eq!(tree.total_size(), 4 * 40 + 90);
    }

    #[test]
    fn scroll_to_key_brings_row_into_view() {
        let roots: Vec<_> = (0..100).map(|i| TreeNode::new(i).with_key(i)).collect();
        let mut tree = Tree::new(roots, TreeConfig::default().with_container_height(200));
        assert_eq!(tree.scroll_to_key(&Key::from(50), Align::Start), Some(2_000));
        assert_eq!(tree.scroll_offset(), 2_000);
        assert!(tree.scroll_to_key(&Key::from("missing"), Align::Start).is_none());
    }

    #[test]
    fn try_new_rejects_duplicates() {
        let roots = vec![TreeNode::new("a").with_key("k"), TreeNode::new("b").with_key("k")];
        assert!(matches!(
            Tree::try_new(roots, TreeConfig::default()),
            Err(Error::Key(KeyError::DuplicateKey { .. }))
        ));
    }
}
