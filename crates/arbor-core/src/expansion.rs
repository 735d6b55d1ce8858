#![forbid(unsafe_code)]

//! Expansion state machine.
//!
//! Each branch key is either in the expansion set (open) or not. Transitions
//! are [`ExpansionState::toggle`] and [`ExpansionState::set_all`]; expand-all
//! and collapse-all are built on the latter. Ownership follows
//! [`OwnedState`]: uncontrolled instances mutate then notify, controlled
//! instances only notify.
//!
//! Any change to the effective set bumps [`ExpansionState::revision`], which
//! consumers use to know the flattened rows (and the virtualizer's total
//! size) are stale.

use std::fmt;

use crate::KeySet;
use crate::flatten::{ExpandPolicy, branch_keys, initial_expanded};
use crate::key::Key;
use crate::node::TreeNode;
use crate::ownership::{OwnedState, Ownership};

/// Callback invoked with the proposed expansion set.
pub type OnExpandedKeysChange = Box<dyn FnMut(&KeySet)>;

/// Owner of the expanded-keys set.
pub struct ExpansionState {
    state: OwnedState<KeySet>,
    on_change: Option<OnExpandedKeysChange>,
}

impl Default for ExpansionState {
    fn default() -> Self {
        Self::new(KeySet::new())
    }
}

impl fmt::Debug for ExpansionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionState")
            .field("state", &self.state)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl ExpansionState {
    /// Create an uncontrolled state with the given initial set.
    #[must_use]
    pub fn new(initial: KeySet) -> Self {
        Self {
            state: OwnedState::new(initial),
            on_change: None,
        }
    }

    /// Create an uncontrolled state seeded from `policy`.
    #[must_use]
    pub fn from_policy<T>(roots: &[TreeNode<T>], policy: &ExpandPolicy) -> Self {
        Self::new(initial_expanded(roots, policy))
    }

    /// Set the change listener.
    #[must_use]
    pub fn with_listener(mut self, listener: impl FnMut(&KeySet) + 'static) -> Self {
        self.on_change = Some(Box::new(listener));
        self
    }

    /// Replace the change listener.
    pub fn set_listener(&mut self, listener: Option<OnExpandedKeysChange>) {
        self.on_change = listener;
    }

    /// Apply this render's controlled value (`None` = uncontrolled).
    ///
    /// Returns `true` when the effective set changed.
    pub fn sync(&mut self, controlled: Option<KeySet>) -> bool {
        self.state.sync(controlled)
    }

    /// Ownership for the current render.
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        self.state.ownership()
    }

    /// Effective expansion set.
    #[must_use]
    pub fn keys(&self) -> &KeySet {
        self.state.current()
    }

    /// Whether `key` is expanded.
    #[must_use]
    pub fn is_expanded(&self, key: &Key) -> bool {
        self.state.current().contains(key)
    }

    /// Change counter for invalidating derived rows.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.revision()
    }

    /// Flip membership of `key`; returns the proposed set.
    pub fn toggle(&mut self, key: &Key) -> KeySet {
        let mut next = self.state.current().clone();
        if !next.remove(key) {
            next.insert(key.clone());
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            key = %key,
            expanded = next.contains(key),
            controlled = self.state.is_controlled(),
            "expansion toggle"
        );

        self.propose(next)
    }

    /// Replace the set wholesale; returns the proposed set.
    pub fn set_all(&mut self, keys: KeySet) -> KeySet {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            count = keys.len(),
            controlled = self.state.is_controlled(),
            "expansion set_all"
        );

        self.propose(keys)
    }

    /// Expand every branch of `roots`.
    pub fn expand_all<T>(&mut self, roots: &[TreeNode<T>]) -> KeySet {
        self.set_all(branch_keys(roots))
    }

    /// Collapse everything.
    pub fn collapse_all(&mut self) -> KeySet {
        self.set_all(KeySet::new())
    }

    /// Re-seed the internal set from `policy` without notifying.
    pub fn reinitialize<T>(&mut self, roots: &[TreeNode<T>], policy: &ExpandPolicy) {
        self.restore(initial_expanded(roots, policy));
    }

    /// Overwrite the internal set without notifying.
    pub fn restore(&mut self, keys: KeySet) {
        self.state.reset(keys);
    }

    fn propose(&mut self, next: KeySet) -> KeySet {
        let proposal = next.clone();
        let on_change = &mut self.on_change;
        self.state.propose(next, |keys| {
            if let Some(listener) = on_change.as_mut() {
                listener(keys);
            }
        });
        proposal
    }
}
