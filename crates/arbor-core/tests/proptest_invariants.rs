//! Property-based invariant tests for the tree core.
//!
//! 1. Flatten order is pre-order restricted to expanded branches.
//! 2. Collapsing a branch removes exactly its descendant rows.
//! 3. `visible_count` agrees with `flatten`.
//! 4. Derived keys are stable across unrelated sibling changes.
//! 5. Distinct paths yield distinct derived keys.
//! 6. Single selection never holds more than one key.
//! 7. Disabled nodes never change the selection.
//! 8. Toggling a key twice restores the expansion set.
//! 9. Filtering keeps every match together with its ancestors.
//! 10. Duplicate keys never panic.

use arbor_core::{
    ExpansionState, Key, KeySet, SelectionMode, SelectionState, TreeNode, branch_keys, filter_tree,
    flatten, resolve_key, tree_len, validate_unique_keys, visible_count,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn node_strategy() -> impl Strategy<Value = TreeNode<u32>> {
    let leaf = (0u32..1_000, any::<bool>())
        .prop_map(|(title, disabled)| TreeNode::new(title).disabled(disabled && title % 4 == 0));
    leaf.prop_recursive(4, 48, 5, |inner| {
        (0u32..1_000, prop::collection::vec(inner, 0..5))
            .prop_map(|(title, children)| TreeNode::new(title).with_children(children))
    })
}

fn roots_strategy() -> impl Strategy<Value = Vec<TreeNode<u32>>> {
    prop::collection::vec(node_strategy(), 0..6)
}

/// Pre-order walk collecting (path, key) of every visible node.
fn reference_order(
    nodes: &[TreeNode<u32>],
    expanded: &KeySet,
    path: &mut Vec<usize>,
    out: &mut Vec<(Vec<usize>, Key)>,
) {
    for (idx, node) in nodes.iter().enumerate() {
        path.push(idx);
        let key = resolve_key(node, path);
        out.push((path.clone(), key.clone()));
        if !node.is_leaf() && expanded.contains(&key) {
            reference_order(node.children(), expanded, path, out);
        }
        path.pop();
    }
}

fn subset(all: &KeySet, mask: &[bool]) -> KeySet {
    all.iter()
        .zip(mask.iter().cycle())
        .filter(|(_, keep)| **keep)
        .map(|(k, _)| k.clone())
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Flatten order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn flatten_is_restricted_pre_order(
        roots in roots_strategy(),
        mask in prop::collection::vec(any::<bool>(), 1..16),
    ) {
        let expanded = subset(&branch_keys(&roots), &mask);
        let rows = flatten(&roots, &expanded);

        let mut expected = Vec::new();
        reference_order(&roots, &expanded, &mut Vec::new(), &mut expected);

        prop_assert_eq!(rows.len(), expected.len());
        for (row, (path, key)) in rows.iter().zip(expected.iter()) {
            prop_assert_eq!(row.path.as_slice(), path.as_slice());
            prop_assert_eq!(&row.key, key);
            prop_assert_eq!(row.level, path.len() - 1);
        }
    }
}

proptest! {
    #[test]
    fn parents_precede_children(roots in roots_strategy()) {
        let rows = flatten(&roots, &branch_keys(&roots));
        prop_assert_eq!(rows.len(), tree_len(&roots));
        for (i, row) in rows.iter().enumerate() {
            if let Some(parent) = &row.parent_key {
                let pos = rows.iter().position(|r| &r.key == parent);
                prop_assert!(matches!(pos, Some(p) if p < i), "parent after child at {}", i);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Collapse removes exactly the descendants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn collapse_removes_descendants_only(roots in roots_strategy(), pick in any::<prop::sample::Index>()) {
        let all = branch_keys(&roots);
        prop_assume!(!all.is_empty());
        let before = flatten(&roots, &all);

        let victim = pick.get(&before.iter().filter(|r| !r.is_leaf).collect::<Vec<_>>()).clone();
        let mut collapsed = all.clone();
        collapsed.remove(&victim.key);
        let after = flatten(&roots, &collapsed);

        let prefix = victim.path.as_slice();
        let expected: Vec<_> = before
            .iter()
            .filter(|r| {
                let p = r.path.as_slice();
                !(p.len() > prefix.len() && p.starts_with(prefix))
            })
            .map(|r| r.key.clone())
            .collect();
        let got: Vec<_> = after.iter().map(|r| r.key.clone()).collect();
        prop_assert_eq!(got, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. visible_count agrees with flatten
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn visible_count_matches_flatten(
        roots in roots_strategy(),
        mask in prop::collection::vec(any::<bool>(), 1..16),
    ) {
        let expanded = subset(&branch_keys(&roots), &mask);
        prop_assert_eq!(visible_count(&roots, &expanded), flatten(&roots, &expanded).len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4-5. Key stability and uniqueness
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn keys_stable_across_sibling_changes(roots in roots_strategy(), extra in node_strategy()) {
        prop_assume!(roots.len() >= 2);
        let all = branch_keys(&roots);
        let first_keys: Vec<Key> = flatten(&roots[..1], &all).into_iter().map(|r| r.key).collect();

        let mut mutated = roots.clone();
        mutated[1].children_mut().push(extra.clone());
        mutated.push(extra);
        let mutated_all = branch_keys(&mutated);
        let rows = flatten(&mutated, &mutated_all);
        let again: Vec<Key> = rows
            .into_iter()
            .filter(|r| r.path.as_slice()[0] == 0)
            .map(|r| r.key)
            .collect();
        prop_assert_eq!(first_keys, again);
    }
}

proptest! {
    #[test]
    fn derived_keys_are_unique(roots in roots_strategy()) {
        prop_assert!(validate_unique_keys(&roots).is_ok());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6-7. Selection invariants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn single_selection_at_most_one(
        roots in roots_strategy(),
        clicks in prop::collection::vec(any::<prop::sample::Index>(), 0..32),
    ) {
        let rows = flatten(&roots, &branch_keys(&roots));
        prop_assume!(!rows.is_empty());
        let mut sel = SelectionState::new(SelectionMode::Single);
        for click in clicks {
            let row = click.get(&rows);
            let Some(node) = row.node(&roots) else { continue };
            let before = sel.keys().clone();
            let info = sel.select(&row.key, node);
            prop_assert!(sel.keys().len() <= 1);
            if node.is_disabled() {
                prop_assert!(info.is_none());
                prop_assert_eq!(sel.keys(), &before);
            } else if before.contains(&row.key) {
                prop_assert!(sel.keys().is_empty(), "reselect must clear");
            }
        }
    }
}

proptest! {
    #[test]
    fn multiple_selection_disabled_is_inert(
        roots in roots_strategy(),
        clicks in prop::collection::vec(any::<prop::sample::Index>(), 0..32),
    ) {
        let rows = flatten(&roots, &branch_keys(&roots));
        prop_assume!(!rows.is_empty());
        let mut sel = SelectionState::new(SelectionMode::Multiple);
        for click in clicks {
            let row = click.get(&rows);
            let Some(node) = row.node(&roots) else { continue };
            let before = sel.keys().clone();
            sel.select(&row.key, node);
            if node.is_disabled() {
                prop_assert_eq!(sel.keys(), &before);
            } else {
                let diff: Vec<_> = sel.keys().symmetric_difference(&before).collect();
                prop_assert_eq!(diff, vec![&row.key]);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Toggle idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn toggle_twice_restores(
        initial in prop::collection::btree_set(0i64..50, 0..20),
        key in 0i64..60,
    ) {
        let initial: KeySet = initial.into_iter().map(Key::Int).collect();
        let mut state = ExpansionState::new(initial.clone());
        state.toggle(&Key::Int(key));
        state.toggle(&Key::Int(key));
        prop_assert_eq!(state.keys(), &initial);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 9. Filter ancestor preservation
// ═════════════════════════════════════════════════════════════════════════

fn count_matches(nodes: &[TreeNode<u32>], divisor: u32) -> usize {
    nodes
        .iter()
        .map(|n| usize::from(n.title() % divisor == 0) + count_matches(n.children(), divisor))
        .sum()
}

fn all_kept_justified(nodes: &[TreeNode<u32>], divisor: u32) -> bool {
    nodes.iter().all(|n| {
        (n.title() % divisor == 0 || !n.is_leaf()) && all_kept_justified(n.children(), divisor)
    })
}

proptest! {
    #[test]
    fn filter_keeps_matches_and_ancestors(roots in roots_strategy(), divisor in 2u32..7) {
        let filtered = filter_tree(&roots, |n| n.title() % divisor == 0);
        prop_assert_eq!(count_matches(&filtered, divisor), count_matches(&roots, divisor));
        prop_assert!(all_kept_justified(&filtered, divisor));
        prop_assert!(tree_len(&filtered) <= tree_len(&roots));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 10. Duplicate keys never panic
// ═════════════════════════════════════════════════════════════════════════

fn force_key(nodes: &mut [TreeNode<u32>]) {
    for node in nodes.iter_mut() {
        force_key(node.children_mut());
    }
    for node in nodes.iter_mut() {
        let children = std::mem::take(node.children_mut());
        *node = TreeNode::new(*node.title())
            .with_key("dup")
            .with_children(children);
    }
}

proptest! {
    #[test]
    fn duplicate_keys_do_not_panic(mut roots in roots_strategy()) {
        force_key(&mut roots);
        let total = tree_len(&roots);
        prop_assert_eq!(validate_unique_keys(&roots).is_err(), total >= 2);

        let mut state = ExpansionState::default();
        state.toggle(&Key::from("dup"));
        let rows = flatten(&roots, state.keys());
        prop_assert!(rows.len() <= total);
        prop_assert_eq!(visible_count(&roots, state.keys()), rows.len());
    }
}
