//! Hierarchical node model.
//!
//! # Example
//!
//! ```
//! use arbor_core::node::TreeNode;
//!
//! let roots = vec![TreeNode::new("src")
//!     .child(TreeNode::new("main.rs"))
//!     .child(TreeNode::new("lib.rs").disabled(true))];
//!
//! assert_eq!(*roots[0].title(), "src");
//! assert_eq!(roots[0].children().len(), 2);
//! assert!(roots[0].children()[1].is_disabled());
//! ```

use crate::key::Key;

/// A node in a hierarchical dataset.
///
/// The title is an opaque payload the core never interprets. A node with no
/// children is a leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    key: Option<Key>,
    title: T,
    children: Vec<TreeNode<T>>,
    disabled: bool,
}

impl<T> TreeNode<T> {
    /// Create a leaf node with the given title and no explicit key.
    #[must_use]
    pub fn new(title: T) -> Self {
        Self {
            key: None,
            title,
            children: Vec::new(),
            disabled: false,
        }
    }

    /// Set an explicit key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add a child node.
    #[must_use]
    pub fn child(mut self, node: TreeNode<T>) -> Self {
        self.children.push(node);
        self
    }

    /// Set children from a vec.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<TreeNode<T>>) -> Self {
        self.children = nodes;
        self
    }

    /// Set whether this node is disabled.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Explicit key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Display payload.
    #[must_use]
    pub fn title(&self) -> &T {
        &self.title
    }

    /// Children in order.
    #[must_use]
    pub fn children(&self) -> &[TreeNode<T>] {
        &self.children
    }

    /// Mutable access to children.
    pub fn children_mut(&mut self) -> &mut Vec<TreeNode<T>> {
        &mut self.children
    }

    /// Whether this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether this node is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_len).sum::<usize>()
    }
}

impl<T: Clone> TreeNode<T> {
    /// Copy of this node without its children.
    #[must_use]
    pub(crate) fn detached(&self) -> Self {
        Self {
            key: self.key.clone(),
            title: self.title.clone(),
            children: Vec::new(),
            disabled: self.disabled,
        }
    }
}

/// Look up the node at a structural path.
#[must_use]
pub fn node_at_path<'a, T>(roots: &'a [TreeNode<T>], path: &[usize]) -> Option<&'a TreeNode<T>> {
    let (&first, rest) = path.split_first()?;
    let mut current = roots.get(first)?;
    for &idx in rest {
        current = current.children.get(idx)?;
    }
    Some(current)
}

/// Total number of nodes across all roots.
#[must_use]
pub fn tree_len<T>(roots: &[TreeNode<T>]) -> usize {
    roots.iter().map(TreeNode::subtree_len).sum()
}
