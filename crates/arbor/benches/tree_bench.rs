//! Benchmarks for the facade components over large datasets.
//!
//! Run with: cargo bench -p arbor

use arbor::{
    ExpandPolicy, RowSelectionType, SelectAll, TableConfig, Tree, TreeConfig, TreeNode,
    VirtualTable,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn forest(roots: usize, leaves: usize) -> Vec<TreeNode<u32>> {
    (0..roots)
        .map(|r| {
            TreeNode::new(r as u32).with_children(
                (0..leaves)
                    .map(|l| TreeNode::new((r * leaves + l) as u32))
                    .collect(),
            )
        })
        .collect()
}

// ============================================================================
// Tree
// ============================================================================

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("arbor/tree");

    for roots in [100usize, 1_000, 10_000] {
        let data = forest(roots, 10);

        group.bench_with_input(BenchmarkId::new("build_expanded", roots), &data, |b, data| {
            b.iter(|| black_box(Tree::new(data.clone(), TreeConfig::default())))
        });

        let collapsed =
            TreeConfig::default().with_policy(ExpandPolicy::new().with_auto_expand_root(false));
        let mut tree = Tree::new(data.clone(), collapsed);
        group.bench_with_input(BenchmarkId::new("toggle_first", roots), &roots, |b, _| {
            b.iter(|| black_box(tree.toggle_row(0)))
        });

        let mut tree = Tree::new(data, TreeConfig::default());
        let rows = tree.rows().len() as u64;
        group.bench_with_input(BenchmarkId::new("scroll_and_render", roots), &rows, |b, rows| {
            let mut offset = 0u64;
            b.iter(|| {
                offset = (offset + 3_001) % (rows * 40);
                tree.scroll_to(offset);
                black_box(tree.render(|node, ctx| (*node.title(), ctx.indent)))
            })
        });
    }

    group.finish();
}

// ============================================================================
// Table
// ============================================================================

fn bench_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("arbor/table");

    for n in [10_000usize, 150_000] {
        let rows: Vec<u32> = (0..n as u32).collect();

        group.bench_with_input(BenchmarkId::new("select_all", n), &rows, |b, rows| {
            b.iter(|| {
                let mut table = VirtualTable::new(
                    rows.clone(),
                    TableConfig::default().with_selection(RowSelectionType::Checkbox),
                );
                match table.select_all(true) {
                    SelectAll::Immediate(keys) => black_box(keys.len()),
                    SelectAll::Chunked(mut job) => {
                        job.run(&mut table);
                        black_box(table.selected_keys().len())
                    }
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tree, bench_table);
criterion_main!(benches);
