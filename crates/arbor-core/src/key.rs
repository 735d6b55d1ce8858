#![forbid(unsafe_code)]

//! Stable node identity.
//!
//! Every node in a hierarchical dataset is addressed by a [`Key`]. Callers
//! may supply one explicitly; otherwise the key is derived from the node's
//! structural path (the zero-based child indices from the root), rendered
//! as `"0-2-1"`.
//!
//! # Invariants
//!
//! 1. An explicit key is returned unchanged.
//! 2. A derived key depends only on the node's own path, so edits to
//!    unrelated sibling subtrees never shift it.
//! 3. Two different paths never render to the same derived key.
//!
//! Keys must be unique across a tree. Duplicates (including an explicit key
//! that happens to equal another node's derived path key) are undefined
//! behaviour and are not defended against at runtime; use
//! [`validate_unique_keys`] in tests and debug tooling.

use std::collections::HashMap;
use std::fmt;

use crate::node::TreeNode;

/// Separator between path segments of a derived key.
pub const PATH_SEPARATOR: char = '-';

/// Identifier of a node or row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Integer key.
    Int(i64),
    /// String key (explicit, or a rendered structural path).
    Str(String),
}

impl Key {
    /// The string form, if this is a string key.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Int(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<&KeyPath> for Key {
    fn from(path: &KeyPath) -> Self {
        Self::Str(path.to_string())
    }
}

/// Structural position of a node: child indices from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath(Vec<usize>);

impl KeyPath {
    /// Path of the `index`-th root node.
    #[must_use]
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// Path of the `index`-th child of this node.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(index);
        Self(segments)
    }

    /// Path of the parent node, `None` for roots and the empty path.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Depth of the addressed node (root = 0). The empty path has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Path segments.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Whether the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[usize]> for KeyPath {
    fn from(segments: &[usize]) -> Self {
        Self(segments.to_vec())
    }
}

impl From<Vec<usize>> for KeyPath {
    fn from(segments: Vec<usize>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Render a path slice the same way [`KeyPath`]'s `Display` does.
fn render_path(path: &[usize]) -> String {
    let mut out = String::with_capacity(path.len() * 2);
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push(PATH_SEPARATOR);
        }
        out.push_str(&segment.to_string());
    }
    out
}

/// Resolve the key of `node` located at `path`.
///
/// Returns the explicit key when present, otherwise the rendered path.
#[must_use]
pub fn resolve_key<T>(node: &TreeNode<T>, path: &[usize]) -> Key {
    match node.key() {
        Some(key) => key.clone(),
        None => Key::Str(render_path(path)),
    }
}

/// Copy `roots` with every node carrying its resolved key explicitly.
///
/// Projections such as [`filter_tree`](crate::filter::filter_tree) change
/// node paths; pinning first keeps each surviving node's unfiltered key.
#[must_use]
pub fn pin_keys<T: Clone>(roots: &[TreeNode<T>]) -> Vec<TreeNode<T>> {
    let mut path = Vec::new();
    pin_in(roots, &mut path)
}

fn pin_in<T: Clone>(nodes: &[TreeNode<T>], path: &mut Vec<usize>) -> Vec<TreeNode<T>> {
    nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            path.push(idx);
            let children = pin_in(node.children(), path);
            let pinned = node
                .detached()
                .with_key(resolve_key(node, path))
                .with_children(children);
            path.pop();
            pinned
        })
        .collect()
}

/// Find the first node (pre-order) whose resolved key equals `key`.
#[must_use]
pub fn find_node<'a, T>(roots: &'a [TreeNode<T>], key: &Key) -> Option<&'a TreeNode<T>> {
    let mut path = Vec::new();
    find_in(roots, key, &mut path)
}

fn find_in<'a, T>(
    nodes: &'a [TreeNode<T>],
    key: &Key,
    path: &mut Vec<usize>,
) -> Option<&'a TreeNode<T>> {
    for (idx, node) in nodes.iter().enumerate() {
        path.push(idx);
        if resolve_key(node, path) == *key {
            path.pop();
            return Some(node);
        }
        let found = find_in(node.children(), key, path);
        path.pop();
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Error reported by [`validate_unique_keys`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Two nodes resolved to the same key.
    DuplicateKey {
        key: Key,
        first: KeyPath,
        second: KeyPath,
    },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey { key, first, second } => write!(
                f,
                "duplicate node key {key:?} at paths [{first}] and [{second}]"
            ),
        }
    }
}

impl std::error::Error for KeyError {}

/// Check that every node in the tree resolves to a distinct key.
///
/// Reports the first collision found in pre-order.
pub fn validate_unique_keys<T>(roots: &[TreeNode<T>]) -> Result<(), KeyError> {
    let mut seen: HashMap<Key, KeyPath> = HashMap::new();
    let mut path = Vec::new();
    validate_in(roots, &mut seen, &mut path)
}

fn validate_in<T>(
    nodes: &[TreeNode<T>],
    seen: &mut HashMap<Key, KeyPath>,
    path: &mut Vec<usize>,
) -> Result<(), KeyError> {
    for (idx, node) in nodes.iter().enumerate() {
        path.push(idx);
        let key = resolve_key(node, path);
        if let Some(first) = seen.get(&key) {
            return Err(KeyError::DuplicateKey {
                key,
                first: first.clone(),
                second: KeyPath::from(path.as_slice()),
            });
        }
        seen.insert(key, KeyPath::from(path.as_slice()));
        validate_in(node.children(), seen, path)?;
        path.pop();
    }
    Ok(())
}
