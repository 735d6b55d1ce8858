//! Ancestor-preserving tree filter.
//!
//! [`filter_tree`] keeps a node when it matches the predicate or when at
//! least one of its descendants is kept. Children of a matching branch that
//! neither match nor contain a match are dropped, not hidden; a matching
//! branch whose children all fail ends up with no children.
//!
//! The projection is a fresh tree sharing nothing with the input and is
//! cheap enough to recompute on every keystroke for trees in the low
//! thousands of nodes.

use std::borrow::Cow;

use crate::node::TreeNode;

/// Titles that expose searchable text.
///
/// Titles returning `None` never match a text query.
pub trait NodeText {
    /// Text to search, if any.
    fn node_text(&self) -> Option<&str>;
}

impl NodeText for String {
    fn node_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl NodeText for &str {
    fn node_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl NodeText for Box<str> {
    fn node_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl<T: NodeText> NodeText for Option<T> {
    fn node_text(&self) -> Option<&str> {
        self.as_ref().and_then(NodeText::node_text)
    }
}

/// Filter `roots`, keeping matches and every ancestor of a match.
#[must_use]
pub fn filter_tree<T, P>(roots: &[TreeNode<T>], predicate: P) -> Vec<TreeNode<T>>
where
    T: Clone,
    P: Fn(&TreeNode<T>) -> bool,
{
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("filter_tree", roots = roots.len()).entered();

    filter_nodes(roots, &predicate)
}

fn filter_nodes<T, P>(nodes: &[TreeNode<T>], predicate: &P) -> Vec<TreeNode<T>>
where
    T: Clone,
    P: Fn(&TreeNode<T>) -> bool,
{
    nodes
        .iter()
        .filter_map(|node| {
            let children = filter_nodes(node.children(), predicate);
            if predicate(node) || !children.is_empty() {
                Some(node.detached().with_children(children))
            } else {
                None
            }
        })
        .collect()
}

/// Whether `query` asks for any filtering at all.
#[must_use]
pub fn is_active_query(query: &str) -> bool {
    !query.trim().is_empty()
}

/// Case-insensitive substring predicate over [`NodeText`] titles.
pub fn title_contains<T: NodeText>(query: &str) -> impl Fn(&TreeNode<T>) -> bool + use<T> {
    let needle = query.to_lowercase();
    move |node| {
        node.title()
            .node_text()
            .is_some_and(|text| text.to_lowercase().contains(&needle))
    }
}

/// Apply a text query; a blank query borrows the input unchanged.
#[must_use]
pub fn filter_by_query<'a, T>(roots: &'a [TreeNode<T>], query: &str) -> Cow<'a, [TreeNode<T>]>
where
    T: Clone + NodeText,
{
    if !is_active_query(query) {
        return Cow::Borrowed(roots);
    }
    Cow::Owned(filter_tree(roots, title_contains(query)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    fn docs() -> Vec<TreeNode<String>> {
        vec![
            TreeNode::new("Documents".to_string())
                .child(TreeNode::new("report.pdf".to_string()))
                .child(TreeNode::new("notes.txt".to_string())),
        ]
    }

    #[test]
    fn keeps_ancestor_of_match() {
        let out = filter_tree(&docs(), title_contains("report"));
        let expected = vec![
            TreeNode::new("Documents".to_string()).child(TreeNode::new("report.pdf".to_string())),
        ];
        assert_eq!(out, expected);
    }

    #[test]
    fn matching_branch_loses_unmatched_children() {
        let out = filter_tree(&docs(), title_contains("docu"));
        assert_eq!(out.len(), 1);
        assert!(out[0].is_leaf());
    }

    #[test]
    fn nothing_matches() {
        assert!(filter_tree(&docs(), title_contains("zzz")).is_empty());
    }

    #[test]
    fn match_is_case_insensitive() {
        let out = filter_tree(&docs(), title_contains("NOTES"));
        assert_eq!(out[0].children().len(), 1);
        assert_eq!(out[0].children()[0].title(), "notes.txt");
    }

    #[test]
    fn deep_match_keeps_whole_chain() {
        let roots = vec![
            TreeNode::new("a")
                .child(TreeNode::new("b").child(TreeNode::new("c").child(TreeNode::new("needle"))))
                .child(TreeNode::new("x")),
            TreeNode::new("y"),
        ];
        let out = filter_tree(&roots, title_contains("needle"));
        assert_eq!(out.len(), 1);
        let c = &out[0].children()[0].children()[0];
        assert_eq!(*c.title(), "c");
        assert_eq!(*c.children()[0].title(), "needle");
        assert_eq!(out[0].children().len(), 1);
    }

    #[test]
    fn keys_and_flags_survive() {
        let roots = vec![
            TreeNode::new("folder")
                .with_key("f")
                .child(TreeNode::new("hit").with_key(7).disabled(true)),
        ];
        let out = filter_tree(&roots, title_contains("hit"));
        assert_eq!(out[0].key(), Some(&Key::from("f")));
        assert_eq!(out[0].children()[0].key(), Some(&Key::Int(7)));
        assert!(out[0].children()[0].is_disabled());
    }

    #[test]
    fn non_text_titles_never_match() {
        let roots = vec![TreeNode::new(None::<String>), TreeNode::new(Some("hit".to_string()))];
        let out = filter_tree(&roots, title_contains("hit"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn blank_query_borrows() {
        let roots = docs();
        assert!(matches!(filter_by_query(&roots, "  "), Cow::Borrowed(_)));
        let filtered = filter_by_query(&roots, "report");
        assert!(matches!(filtered, Cow::Owned(_)));
        assert_eq!(filtered[0].children().len(), 1);
    }

    #[test]
    fn input_is_untouched() {
        let roots = docs();
        let _ = filter_tree(&roots, title_contains("report"));
        assert_eq!(roots, docs());
    }
}
