//! Single-value picker over a searchable tree.
//!
//! Keys are pinned on the source data before any filtering, so a node keeps
//! the same key whether it is picked from the full tree or from a search
//! result. While a query is active every branch of the filtered tree is
//! expanded; the browse expansion comes back when the query is cleared. The
//! dropdown tree stays mounted, so measured row heights survive searches and
//! data changes.

use std::fmt;
use std::time::{Duration, Instant};

use arbor_core::debounce::DEFAULT_DEBOUNCE;
use arbor_core::{
    DebounceAction, ExpandPolicy, Key, KeySet, NodeText, OwnedState, QueryDebouncer, TreeNode,
    filter_by_query, find_node, is_active_query, pin_keys,
};

use crate::frame::RenderFrame;
use crate::tree::{ExpandAction, RowContext, Tree, TreeConfig};

/// Default height of the dropdown list.
pub const DEFAULT_LIST_HEIGHT: u32 = 300;

/// `(value, node)`; both `None` when the value is cleared.
pub type OnTreeSelectChange<T> = Box<dyn FnMut(Option<&Key>, Option<&TreeNode<T>>)>;

/// Picker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSelectConfig {
    pub list_height: u32,
    pub searchable: bool,
    pub allow_clear: bool,
    pub disabled: bool,
    /// Use the file-browser tree (clicking a folder also toggles it).
    pub directory: bool,
    /// Quiet period before a typed query is applied.
    pub debounce: Duration,
}

impl Default for TreeSelectConfig {
    fn default() -> Self {
        Self {
            list_height: DEFAULT_LIST_HEIGHT,
            searchable: true,
            allow_clear: true,
            disabled: false,
            directory: false,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl TreeSelectConfig {
    #[must_use]
    pub fn with_list_height(mut self, height: u32) -> Self {
        self.list_height = height;
        self
    }

    #[must_use]
    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    #[must_use]
    pub fn with_allow_clear(mut self, allow: bool) -> Self {
        self.allow_clear = allow;
        self
    }

    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn with_directory(mut self, directory: bool) -> Self {
        self.directory = directory;
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    fn tree_config(&self, query: &str) -> TreeConfig {
        let action = if self.directory {
            ExpandAction::Click
        } else {
            ExpandAction::None
        };
        TreeConfig::default()
            .with_policy(ExpandPolicy::new().with_default_expand_all(is_active_query(query)))
            .with_container_height(self.list_height)
            .with_expand_action(action)
    }
}

/// Tree-backed single-value picker.
pub struct TreeSelect<T> {
    source: Vec<TreeNode<T>>,
    config: TreeSelectConfig,
    value: OwnedState<Option<Key>>,
    open: bool,
    query: String,
    debouncer: QueryDebouncer<String>,
    tree: Tree<T>,
    /// Expansion from before the current search, restored when it ends.
    browse_expanded: Option<KeySet>,
    on_change: Option<OnTreeSelectChange<T>>,
}

impl<T: fmt::Debug> fmt::Debug for TreeSelect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSelect")
            .field("config", &self.config)
            .field("value", self.value.current())
            .field("open", &self.open)
            .field("query", &self.query)
            .field("tree", &self.tree)
            .field("has_on_change", &self.on_change.is_some())
            .finish()
    }
}

impl<T: Clone + NodeText> TreeSelect<T> {
    /// Create a closed picker with no value.
    pub fn new(roots: Vec<TreeNode<T>>, config: TreeSelectConfig) -> Self {
        let source = pin_keys(&roots);
        let tree = Tree::new(source.clone(), config.tree_config(""));
        let mut select = Self {
            source,
            config,
            value: OwnedState::new(None),
            open: false,
            query: String::new(),
            debouncer: QueryDebouncer::new(config.debounce),
            tree,
            browse_expanded: None,
            on_change: None,
        };
        select.sync_tree_selection();
        select
    }

    /// Initial uncontrolled value.
    #[must_use]
    pub fn with_default_value(mut self, key: Key) -> Self {
        self.value.reset(Some(key));
        self.sync_tree_selection();
        self
    }

    #[must_use]
    pub fn with_on_change(
        mut self,
        hook: impl FnMut(Option<&Key>, Option<&TreeNode<T>>) + 'static,
    ) -> Self {
        self.on_change = Some(Box::new(hook));
        self
    }

    // ── Value ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn value(&self) -> Option<&Key> {
        self.value.current().as_ref()
    }

    /// Apply this render's controlled value.
    ///
    /// `None` leaves the picker uncontrolled; `Some(None)` controls it to
    /// "no value".
    pub fn sync_value(&mut self, controlled: Option<Option<Key>>) {
        if self.value.sync(controlled) {
            self.sync_tree_selection();
        }
    }

    /// Node behind the current value.
    #[must_use]
    pub fn selected_node(&self) -> Option<&TreeNode<T>> {
        find_node(&self.source, self.value()?)
    }

    /// Text shown in the closed picker.
    #[must_use]
    pub fn display_text(&self) -> Option<&str> {
        self.selected_node()?.title().node_text()
    }

    /// Whether the clear affordance is offered.
    #[must_use]
    pub fn can_clear(&self) -> bool {
        self.config.allow_clear && !self.config.disabled && self.value().is_some()
    }

    /// Pick the visible row at `index`; emits `on_change` and closes.
    ///
    /// Picking the current value emits it again.
    pub fn choose_row(&mut self, index: usize) -> Option<Key> {
        if self.config.disabled {
            return None;
        }
        let click = self.tree.click_row(index)?;
        if click.selected.is_none() {
            return None;
        }
        let key = click.key;

        #[cfg(feature = "tracing")]
        tracing::trace!(key = %key, "tree_select choose");

        let node = find_node(&self.source, &key);
        if let Some(hook) = self.on_change.as_mut() {
            hook(Some(&key), node);
        }
        self.value.propose(Some(key.clone()), |_| {});
        self.open = false;
        self.sync_tree_selection();
        Some(key)
    }

    /// Pick the visible row with `key`.
    pub fn choose(&mut self, key: &Key) -> Option<Key> {
        let index = self.tree.row_index(key)?;
        self.choose_row(index)
    }

    /// Drop the value and the query. Returns whether anything happened.
    pub fn clear(&mut self) -> bool {
        if !self.can_clear() {
            return false;
        }
        if let Some(hook) = self.on_change.as_mut() {
            hook(None, None);
        }
        self.value.propose(None, |_| {});
        self.debouncer.cancel();
        self.apply_query(String::new());
        true
    }

    // ── Popup ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open the dropdown; a disabled picker stays closed.
    pub fn open(&mut self) -> bool {
        if !self.config.disabled {
            self.open = true;
        }
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle_open(&mut self) -> bool {
        if self.open {
            self.close();
            false
        } else {
            self.open()
        }
    }

    // ── Search ──────────────────────────────────────────────────────────

    /// Query the visible tree is filtered by.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Record typed text at `now`; returns `true` if it applied immediately.
    pub fn set_query_at(&mut self, query: impl Into<String>, now: Instant) -> bool {
        if !self.config.searchable {
            return false;
        }
        match self.debouncer.push_at(query.into(), now) {
            DebounceAction::Apply(query) => {
                self.apply_query(query);
                true
            }
            DebounceAction::Pending | DebounceAction::None => false,
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        self.set_query_at(query, Instant::now())
    }

    /// Apply the pending query once its quiet period has elapsed.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        match self.debouncer.poll_at(now) {
            DebounceAction::Apply(query) => {
                self.apply_query(query);
                true
            }
            DebounceAction::Pending | DebounceAction::None => false,
        }
    }

    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// Apply the pending query right away.
    pub fn flush_query(&mut self) -> bool {
        match self.debouncer.flush() {
            DebounceAction::Apply(query) => {
                self.apply_query(query);
                true
            }
            DebounceAction::Pending | DebounceAction::None => false,
        }
    }

    /// Time until the pending query applies.
    #[must_use]
    pub fn query_due_in(&self, now: Instant) -> Option<Duration> {
        self.debouncer.time_until_apply(now)
    }

    // ── Data and rendering ──────────────────────────────────────────────

    /// Replace the dataset, keeping the query and value.
    pub fn set_data(&mut self, roots: Vec<TreeNode<T>>) {
        self.source = pin_keys(&roots);
        self.rebuild_tree();
    }

    /// The dropdown tree.
    #[must_use]
    pub fn tree(&self) -> &Tree<T> {
        &self.tree
    }

    /// Scrolling and measurement of the dropdown tree.
    pub fn tree_mut(&mut self) -> &mut Tree<T> {
        &mut self.tree
    }

    pub fn render<R>(
        &self,
        render_row: impl FnMut(&TreeNode<T>, &RowContext) -> R,
    ) -> RenderFrame<R> {
        if !self.open {
            return RenderFrame::empty();
        }
        self.tree.render(render_row)
    }

    fn apply_query(&mut self, query: String) {
        #[cfg(feature = "tracing")]
        tracing::debug!(query = %query, "tree_select query applied");

        self.query = query;
        self.rebuild_tree();
    }

    fn rebuild_tree(&mut self) {
        let roots = filter_by_query(&self.source, &self.query).into_owned();
        if is_active_query(&self.query) {
            if self.browse_expanded.is_none() {
                self.browse_expanded = Some(self.tree.expanded_keys().clone());
            }
            let policy = self.config.tree_config(&self.query).policy;
            self.tree.reset_data(roots, &policy);
        } else if let Some(expanded) = self.browse_expanded.take() {
            self.tree.restore_data(roots, expanded);
        } else {
            self.tree.set_data(roots);
        }
        self.sync_tree_selection();
    }

    fn sync_tree_selection(&mut self) {
        let selected: KeySet = self.value.current().iter().cloned().collect();
        self.tree.sync_selected(Some(selected));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn files() -> Vec<TreeNode<String>> {
        vec![
            TreeNode::new("Documents".to_string())
                .child(TreeNode::new("report.pdf".to_string()))
                .child(TreeNode::new("notes.txt".to_string())),
            TreeNode::new("Pictures".to_string()).child(
                TreeNode::new("Holiday".to_string())
                    .child(TreeNode::new("beach.png".to_string())),
            ),
            TreeNode::new("Archive".to_string()).disabled(true),
        ]
    }

    fn immediate() -> TreeSelectConfig {
        TreeSelectConfig::default().with_debounce(Duration::ZERO)
    }

    #[test]
    fn choose_emits_and_closes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut select = TreeSelect::new(files(), immediate()).with_on_change(move |key, node| {
            sink.borrow_mut().push((key.cloned(), node.map(|n| n.title().clone())));
        });
        select.open();
        // auto-expanded: Documents, report.pdf, notes.txt, Pictures, Holiday, Archive
        let key = select.choose_row(1);
        assert_eq!(key, Some(Key::from("0-0")));
        assert!(!select.is_open());
        assert_eq!(select.display_text(), Some("report.pdf"));
        assert_eq!(
            *seen.borrow(),
            vec![(Some(Key::from("0-0")), Some("report.pdf".to_string()))]
        );
        assert!(select.tree().selected_keys().contains(&Key::from("0-0")));
    }

    #[test]
    fn disabled_rows_cannot_be_chosen() {
        let mut select = TreeSelect::new(files(), immediate());
        let archive = select.tree().row_index(&Key::from("2")).unwrap();
        assert!(select.choose_row(archive).is_none());
        assert!(select.value().is_none());
    }

    #[test]
    fn search_filters_and_expands_with_pinned_keys() {
        let mut select = TreeSelect::new(files(), immediate());
        assert!(select.set_query("BEACH"));
        let titles: Vec<_> = (0..select.tree().rows().len())
            .filter_map(|i| select.tree().node(i).map(|n| n.title().clone()))
            .collect();
        assert_eq!(titles, ["Pictures", "Holiday", "beach.png"]);

        assert_eq!(select.choose_row(2), Some(Key::from("1-0-0")));
        assert_eq!(select.display_text(), Some("beach.png"));
    }

    #[test]
    fn search_keeps_measured_heights() {
        let mut select = TreeSelect::new(files(), immediate());
        let pictures = Key::from("1");
        let row = select.tree().row_index(&pictures).unwrap();
        select.tree_mut().measure_row(row, 90);

        select.set_query("holiday");
        let row = select.tree().row_index(&pictures).unwrap();
        assert_eq!(select.tree().virtualizer().size_of(row), Some(90));
        assert_eq!(select.tree().virtualizer().cache_stats().entries, 1);
    }

    #[test]
    fn browse_expansion_survives_search_and_new_data() {
        let mut select = TreeSelect::new(files(), immediate());
        select.tree_mut().collapse_all();
        assert_eq!(select.tree().rows().len(), 3);

        select.set_data(files());
        assert_eq!(select.tree().rows().len(), 3, "user expansion kept");

        let beach = Key::from("1-0-0");
        select.set_query("beach");
        assert!(select.tree().row_index(&beach).is_some(), "search expands matches");
        select.set_query("");
        assert!(select.tree().row_index(&beach).is_none());
        assert!(select.tree().expanded_keys().is_empty(), "browse expansion restored");
    }

    #[test]
    fn blank_query_shows_everything() {
        let mut select = TreeSelect::new(files(), immediate());
        let full = select.tree().rows().len();
        select.set_query("   ");
        assert_eq!(select.tree().rows().len(), full);
    }

    #[test]
    fn debounced_query_waits_for_quiet_period() {
        let mut select = TreeSelect::new(
            files(),
            TreeSelectConfig::default().with_debounce(Duration::from_millis(100)),
        );
        let t0 = Instant::now();
        assert!(!select.set_query_at("rep", t0));
        assert!(!select.set_query_at("report", t0 + Duration::from_millis(50)));
        assert_eq!(select.query(), "");
        assert!(!select.poll_at(t0 + Duration::from_millis(120)));
        assert_eq!(
            select.query_due_in(t0 + Duration::from_millis(120)),
            Some(Duration::from_millis(30))
        );
        assert!(select.poll_at(t0 + Duration::from_millis(150)));
        assert_eq!(select.query(), "report");
        assert_eq!(select.tree().rows().len(), 2);
    }

    #[test]
    fn clear_resets_value_and_query() {
        let cleared = Rc::new(RefCell::new(false));
        let sink = Rc::clone(&cleared);
        let mut select = TreeSelect::new(files(), immediate())
            .with_default_value(Key::from("0-1"))
            .with_on_change(move |key, node| {
                *sink.borrow_mut() = key.is_none() && node.is_none();
            });
        select.set_query("notes");
        assert!(select.can_clear());
        assert!(select.clear());
        assert!(*cleared.borrow());
        assert!(select.value().is_none());
        assert_eq!(select.query(), "");
        assert!(!select.clear(), "nothing left to clear");
    }

    #[test]
    fn controlled_value_follows_owner() {
        let mut select = TreeSelect::new(files(), immediate());
        select.sync_value(Some(Some(Key::from("1"))));
        assert_eq!(select.display_text(), Some("Pictures"));
        select.choose_row(0);
        assert_eq!(select.value(), Some(&Key::from("1")), "owner has not applied the pick");
        select.sync_value(Some(Some(Key::from("0"))));
        assert_eq!(select.display_text(), Some("Documents"));
    }

    #[test]
    fn disabled_picker_stays_closed() {
        let mut select = TreeSelect::new(files(), immediate().with_disabled(true));
        assert!(!select.open());
        assert!(select.render(|_, _| ()).is_empty());
        assert!(select.choose_row(0).is_none());
    }

    #[test]
    fn non_searchable_ignores_queries() {
        let mut select = TreeSelect::new(files(), immediate().with_searchable(false));
        assert!(!select.set_query("report"));
        assert_eq!(select.query(), "");
    }
}
