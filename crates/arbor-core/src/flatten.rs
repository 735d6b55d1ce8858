#![forbid(unsafe_code)]

//! Flattening a partially expanded tree into visible rows.
//!
//! [`flatten`] walks the roots depth-first in array order and emits one
//! [`FlatRow`] per visited node, recursing into a branch only when its key
//! is in the expansion set. Parents therefore always precede their children.
//!
//! Rows do not borrow the tree: each carries the node's structural path, so
//! the node is recovered with [`FlatRow::node`] against the same roots
//! (arena + index addressing).
//!
//! # Initialization policy
//!
//! [`initial_expanded`] seeds an uncontrolled expansion set from an
//! [`ExpandPolicy`]:
//!
//! | `show_toggle_icon` | `default_expand_all` | `auto_expand_root` | Expanded |
//! |--------------------|----------------------|--------------------|----------|
//! | false | any | any | every branch |
//! | true | true | any | every branch |
//! | true | false | true | first-level branches |
//! | true | false | false | nothing extra |
//!
//! `default_expanded_keys` are always unioned in.

use bitflags::bitflags;

use crate::KeySet;
use crate::key::{Key, KeyPath, resolve_key};
use crate::node::{TreeNode, node_at_path};

bitflags! {
    /// Per-row state bits handed to the presentation layer.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RowFlags: u8 {
        /// Node has no children.
        const LEAF     = 0b0001;
        /// Node is disabled.
        const DISABLED = 0b0010;
        /// Branch is in the expansion set.
        const EXPANDED = 0b0100;
        /// Node is in the selection set.
        const SELECTED = 0b1000;
    }
}

/// One visible row of a flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    /// Resolved key of the node.
    pub key: Key,
    /// Structural path of the node.
    pub path: KeyPath,
    /// Depth from the root (root = 0).
    pub level: usize,
    /// Whether the node has no children.
    pub is_leaf: bool,
    /// Key of the parent node, `None` for roots.
    pub parent_key: Option<Key>,
    /// Whether the node is disabled.
    pub disabled: bool,
}

impl FlatRow {
    /// Resolve the node this row was produced from.
    #[must_use]
    pub fn node<'a, T>(&self, roots: &'a [TreeNode<T>]) -> Option<&'a TreeNode<T>> {
        node_at_path(roots, self.path.as_slice())
    }

    /// Whether this row is an expanded branch.
    #[must_use]
    pub fn is_expanded(&self, expanded: &KeySet) -> bool {
        !self.is_leaf && expanded.contains(&self.key)
    }

    /// Static flags of the row (leaf / disabled).
    #[must_use]
    pub fn flags(&self) -> RowFlags {
        let mut flags = RowFlags::empty();
        flags.set(RowFlags::LEAF, self.is_leaf);
        flags.set(RowFlags::DISABLED, self.disabled);
        flags
    }
}

/// Flatten `roots` into the ordered list of visible rows.
#[must_use]
pub fn flatten<T>(roots: &[TreeNode<T>], expanded: &KeySet) -> Vec<FlatRow> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "flatten",
        roots = roots.len(),
        expanded = expanded.len()
    )
    .entered();

    let mut out = Vec::new();
    let mut path = Vec::new();
    walk(roots, expanded, 0, None, &mut path, &mut out);
    out
}

fn walk<T>(
    nodes: &[TreeNode<T>],
    expanded: &KeySet,
    level: usize,
    parent_key: Option<&Key>,
    path: &mut Vec<usize>,
    out: &mut Vec<FlatRow>,
) {
    for (idx, node) in nodes.iter().enumerate() {
        path.push(idx);
        let key = resolve_key(node, path);
        let is_leaf = node.is_leaf();
        let open = !is_leaf && expanded.contains(&key);
        out.push(FlatRow {
            key: key.clone(),
            path: KeyPath::from(path.as_slice()),
            level,
            is_leaf,
            parent_key: parent_key.cloned(),
            disabled: node.is_disabled(),
        });
        if open {
            walk(node.children(), expanded, level + 1, Some(&key), path, out);
        }
        path.pop();
    }
}

/// Number of rows [`flatten`] would produce, without allocating them.
#[must_use]
pub fn visible_count<T>(roots: &[TreeNode<T>], expanded: &KeySet) -> usize {
    fn count<T>(nodes: &[TreeNode<T>], expanded: &KeySet, path: &mut Vec<usize>) -> usize {
        let mut total = 0;
        for (idx, node) in nodes.iter().enumerate() {
            path.push(idx);
            total += 1;
            if !node.is_leaf() && expanded.contains(&resolve_key(node, path)) {
                total += count(node.children(), expanded, path);
            }
            path.pop();
        }
        total
    }
    count(roots, expanded, &mut Vec::new())
}

/// Keys of every branch node in the tree.
#[must_use]
pub fn branch_keys<T>(roots: &[TreeNode<T>]) -> KeySet {
    fn collect<T>(nodes: &[TreeNode<T>], path: &mut Vec<usize>, out: &mut KeySet) {
        for (idx, node) in nodes.iter().enumerate() {
            path.push(idx);
            if !node.is_leaf() {
                out.insert(resolve_key(node, path));
                collect(node.children(), path, out);
            }
            path.pop();
        }
    }
    let mut out = KeySet::new();
    collect(roots, &mut Vec::new(), &mut out);
    out
}

/// Keys of first-level branch nodes.
#[must_use]
pub fn root_branch_keys<T>(roots: &[TreeNode<T>]) -> KeySet {
    roots
        .iter()
        .enumerate()
        .filter(|(_, node)| !node.is_leaf())
        .map(|(idx, node)| resolve_key(node, &[idx]))
        .collect()
}

/// How an uncontrolled expansion set is seeded at mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandPolicy {
    /// Keys always expanded initially.
    pub default_expanded_keys: Vec<Key>,
    /// Expand every branch.
    pub default_expand_all: bool,
    /// Expand first-level branches (ignored when expanding all).
    pub auto_expand_root: bool,
    /// Whether the expand/collapse affordance is shown. When hidden the
    /// user cannot expand anything, so every branch starts expanded.
    pub show_toggle_icon: bool,
}

impl Default for ExpandPolicy {
    fn default() -> Self {
        Self {
            default_expanded_keys: Vec::new(),
            default_expand_all: false,
            auto_expand_root: true,
            show_toggle_icon: true,
        }
    }
}

impl ExpandPolicy {
    /// Create the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the explicitly expanded keys.
    #[must_use]
    pub fn with_default_expanded_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.default_expanded_keys = keys.into_iter().collect();
        self
    }

    /// Expand every branch.
    #[must_use]
    pub fn with_default_expand_all(mut self, expand_all: bool) -> Self {
        self.default_expand_all = expand_all;
        self
    }

    /// Expand first-level branches.
    #[must_use]
    pub fn with_auto_expand_root(mut self, auto: bool) -> Self {
        self.auto_expand_root = auto;
        self
    }

    /// Show or hide the toggle affordance.
    #[must_use]
    pub fn with_show_toggle_icon(mut self, show: bool) -> Self {
        self.show_toggle_icon = show;
        self
    }

    /// Whether this policy expands every branch.
    #[must_use]
    pub fn expands_everything(&self) -> bool {
        !self.show_toggle_icon || self.default_expand_all
    }
}

/// Compute the initial expansion set for `roots` under `policy`.
#[must_use]
pub fn initial_expanded<T>(roots: &[TreeNode<T>], policy: &ExpandPolicy) -> KeySet {
    let mut initial: KeySet = policy.default_expanded_keys.iter().cloned().collect();
    if policy.expands_everything() {
        initial.extend(branch_keys(roots));
    } else if policy.auto_expand_root {
        initial.extend(root_branch_keys(roots));
    }
    initial
}
