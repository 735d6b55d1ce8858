#![forbid(unsafe_code)]

//! Core tree model for Arbor.
//!
//! Keys, node model, flattening of a partially expanded tree into visible
//! rows, the expansion and selection state machines, and the
//! ancestor-preserving search filter. Nothing here knows about scrolling or
//! row geometry; see `arbor-virtual` for that.

pub mod debounce;
pub mod expansion;
pub mod filter;
pub mod flatten;
pub mod key;
pub mod node;
pub mod ownership;
pub mod selection;

/// Ordered set of keys used for expansion and selection.
pub type KeySet = std::collections::BTreeSet<key::Key>;

pub use debounce::{DebounceAction, QueryDebouncer};
pub use expansion::{ExpansionState, OnExpandedKeysChange};
pub use filter::{NodeText, filter_by_query, filter_tree, is_active_query, title_contains};
pub use flatten::{
    ExpandPolicy, FlatRow, RowFlags, branch_keys, flatten, initial_expanded, root_branch_keys,
    visible_count,
};
pub use key::{Key, KeyError, KeyPath, find_node, pin_keys, resolve_key, validate_unique_keys};
pub use node::{TreeNode, node_at_path, tree_len};
pub use ownership::{OwnedState, Ownership};
pub use selection::{OnSelect, SelectInfo, SelectionMode, SelectionState};
