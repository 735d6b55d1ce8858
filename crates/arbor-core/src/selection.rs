#![forbid(unsafe_code)]

//! Selection state machine.
//!
//! # Semantics
//!
//! | Mode | Key already selected | Key not selected |
//! |------|----------------------|------------------|
//! | [`SelectionMode::Single`] | set becomes empty | set becomes `{key}` |
//! | [`SelectionMode::Multiple`] | key removed | key added |
//!
//! Disabled nodes, and every node while `selectable` is off, swallow the
//! click: no state change, no [`SelectInfo`], no notification.
//!
//! Ownership mirrors [`crate::expansion::ExpansionState`] through the same
//! [`OwnedState`] slot.

use std::fmt;

use crate::KeySet;
use crate::key::Key;
use crate::node::TreeNode;
use crate::ownership::{OwnedState, Ownership};

/// How many keys may be selected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// At most one key; clicking the selected key clears it.
    #[default]
    Single,
    /// Any subset; clicking toggles that key only.
    Multiple,
}

/// Outcome of a successful select intent.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectInfo<'a, T> {
    /// New membership of `key`.
    pub selected: bool,
    /// Key that was clicked.
    pub key: Key,
    /// Node that was clicked.
    pub node: &'a TreeNode<T>,
    /// Resulting full selection.
    pub selected_keys: KeySet,
}

/// Callback invoked with the proposed selection and the click details.
pub type OnSelect<T> = Box<dyn for<'a> FnMut(&KeySet, &SelectInfo<'a, T>)>;

/// Owner of the selected-keys set.
pub struct SelectionState<T> {
    state: OwnedState<KeySet>,
    mode: SelectionMode,
    selectable: bool,
    on_select: Option<OnSelect<T>>,
}

impl<T> Default for SelectionState<T> {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

impl<T> fmt::Debug for SelectionState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionState")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("selectable", &self.selectable)
            .field("on_select", &self.on_select.is_some())
            .finish()
    }
}

impl<T> SelectionState<T> {
    /// Create an empty, uncontrolled, selectable state.
    #[must_use]
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            state: OwnedState::new(KeySet::new()),
            mode,
            selectable: true,
            on_select: None,
        }
    }

    /// Seed the uncontrolled selection.
    ///
    /// In single mode only the first key is kept.
    #[must_use]
    pub fn with_default_selected(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        let seeded: KeySet = match self.mode {
            SelectionMode::Single => keys.into_iter().take(1).collect(),
            SelectionMode::Multiple => keys.into_iter().collect(),
        };
        self.state.reset(seeded);
        self
    }

    /// Enable or disable selection entirely.
    #[must_use]
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Set the select listener.
    #[must_use]
    pub fn with_listener(
        mut self,
        listener: impl for<'a> FnMut(&KeySet, &SelectInfo<'a, T>) + 'static,
    ) -> Self {
        self.on_select = Some(Box::new(listener));
        self
    }

    /// Replace the select listener.
    pub fn set_listener(&mut self, listener: Option<OnSelect<T>>) {
        self.on_select = listener;
    }

    /// Apply this render's controlled value (`None` = uncontrolled).
    pub fn sync(&mut self, controlled: Option<KeySet>) -> bool {
        self.state.sync(controlled)
    }

    /// Ownership for the current render.
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        self.state.ownership()
    }

    /// Selection mode.
    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Whether selection is enabled.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    /// Effective selection.
    #[must_use]
    pub fn keys(&self) -> &KeySet {
        self.state.current()
    }

    /// Whether `key` is selected.
    #[must_use]
    pub fn is_selected(&self, key: &Key) -> bool {
        self.state.current().contains(key)
    }

    /// Change counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.revision()
    }

    /// Whether `node` accepts a select intent.
    #[must_use]
    pub fn can_select(&self, node: &TreeNode<T>) -> bool {
        self.selectable && !node.is_disabled()
    }

    /// Handle a click on `node` (resolved to `key`).
    ///
    /// Returns `None` when the click is swallowed.
    pub fn select<'a>(&mut self, key: &Key, node: &'a TreeNode<T>) -> Option<SelectInfo<'a, T>> {
        if !self.can_select(node) {
            #[cfg(feature = "tracing")]
            tracing::trace!(key = %key, "select swallowed");
            return None;
        }

        let current = self.state.current();
        let was_selected = current.contains(key);
        let next = match self.mode {
            SelectionMode::Multiple => {
                let mut next = current.clone();
                if was_selected {
                    next.remove(key);
                } else {
                    next.insert(key.clone());
                }
                next
            }
            SelectionMode::Single if was_selected => KeySet::new(),
            SelectionMode::Single => KeySet::from([key.clone()]),
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            key = %key,
            selected = !was_selected,
            count = next.len(),
            controlled = self.state.is_controlled(),
            "select"
        );

        let info = SelectInfo {
            selected: !was_selected,
            key: key.clone(),
            node,
            selected_keys: next.clone(),
        };
        let on_select = &mut self.on_select;
        self.state.propose(next, |keys| {
            if let Some(listener) = on_select.as_mut() {
                listener(keys, &info);
            }
        });
        Some(info)
    }

    /// Replace the selection wholesale without a click (e.g. clear).
    ///
    /// Follows the same ownership routing but emits no `SelectInfo`.
    pub fn set_all(&mut self, keys: KeySet) -> KeySet {
        let proposal = keys.clone();
        self.state.propose(keys, |_| {});
        proposal
    }
}
