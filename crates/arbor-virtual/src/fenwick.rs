//! Fenwick tree (Binary Indexed Tree) over item sizes.
//!
//! Each entry holds the pixel extent of one item as a `u32`; prefix sums are
//! accumulated in `u64` so a million rows of large content cannot overflow.
//!
//! # Layout
//!
//! Stored 1-indexed in a contiguous `Vec<u64>` of length `n + 1` (index 0
//! unused).
//!
//! # Operations
//!
//! | Operation | Time |
//! |-----------|------|
//! | `from_values(values)` | O(n) |
//! | `set(i, value)` | O(log n) |
//! | `prefix(i)` / `sum_before(i)` | O(log n) |
//! | `find_prefix(target)` | O(log n) |
//! | `rebuild(values)` | O(n) |
//!
//! # Invariants
//!
//! 1. `prefix(n - 1) == total() == Σ values`.
//! 2. `sum_before(i)` is the start offset of item `i` when items are laid
//!    out back to back.
//! 3. After `rebuild`, the tree exactly represents the given values.

/// Prefix-sum tree over `u32` values.
#[derive(Debug, Clone, Default)]
pub struct FenwickTree {
    /// 1-indexed storage. `tree[0]` is unused.
    tree: Vec<u64>,
    n: usize,
}

impl FenwickTree {
    /// Create a tree of `n` zeros.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            tree: vec![0; n + 1],
            n,
        }
    }

    /// Build from initial values in O(n).
    #[must_use]
    pub fn from_values(values: &[u32]) -> Self {
        let mut ft = Self::new(values.len());
        ft.fill_from(values);
        ft
    }

    /// Number of values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the tree holds no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Overwrite the value at `i`.
    ///
    /// # Panics
    /// Panics if `i >= len()`.
    pub fn set(&mut self, i: usize, value: u32) {
        let current = self.get(i);
        // Two's complement: adding the wrapped difference is exact as long as
        // every true prefix sum stays non-negative, which it does.
        let delta = u64::from(value).wrapping_sub(u64::from(current));
        let mut idx = i + 1;
        while idx <= self.n {
            self.tree[idx] = self.tree[idx].wrapping_add(delta);
            idx += lowbit(idx);
        }
    }

    /// Value at `i`.
    ///
    /// # Panics
    /// Panics if `i >= len()`.
    #[must_use]
    pub fn get(&self, i: usize) -> u32 {
        let sum = self.prefix(i) - self.sum_before(i);
        u32::try_from(sum).unwrap_or(u32::MAX)
    }

    /// Sum of values `[0..=i]`.
    ///
    /// # Panics
    /// Panics if `i >= len()`.
    #[must_use]
    pub fn prefix(&self, i: usize) -> u64 {
        assert!(i < self.n, "index {i} out of bounds (n={})", self.n);
        self.sum_before(i + 1)
    }

    /// Sum of values `[0..i)`; `sum_before(len())` is the total.
    ///
    /// # Panics
    /// Panics if `i > len()`.
    #[must_use]
    pub fn sum_before(&self, i: usize) -> u64 {
        assert!(i <= self.n, "index {i} out of bounds (n={})", self.n);
        let mut sum = 0u64;
        let mut idx = i;
        while idx > 0 {
            sum = sum.wrapping_add(self.tree[idx]);
            idx -= lowbit(idx);
        }
        sum
    }

    /// Sum of all values.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.sum_before(self.n)
    }

    /// Largest `i` with `prefix(i) <= target`, or `None` when
    /// `values[0] > target`.
    #[must_use]
    pub fn find_prefix(&self, target: u64) -> Option<usize> {
        if self.n == 0 {
            return None;
        }

        let mut pos = 0usize;
        let mut remaining = target;
        let mut step = most_significant_bit(self.n);
        while step > 0 {
            let next = pos + step;
            if next <= self.n && self.tree[next] <= remaining {
                remaining -= self.tree[next];
                pos = next;
            }
            step >>= 1;
        }

        // `pos` counts how many leading values fit within `target`.
        pos.checked_sub(1)
    }

    /// Replace every value in O(n).
    ///
    /// # Panics
    /// Panics if `values.len() != len()`.
    pub fn rebuild(&mut self, values: &[u32]) {
        assert_eq!(values.len(), self.n, "rebuild size mismatch");
        self.fill_from(values);
    }

    fn fill_from(&mut self, values: &[u32]) {
        self.tree.fill(0);
        for (i, &v) in values.iter().enumerate() {
            self.tree[i + 1] = u64::from(v);
        }
        for i in 1..=self.n {
            let parent = i + lowbit(i);
            if parent <= self.n {
                self.tree[parent] = self.tree[parent].wrapping_add(self.tree[i]);
            }
        }
    }
}

#[inline]
fn lowbit(x: usize) -> usize {
    x & x.wrapping_neg()
}

#[inline]
fn most_significant_bit(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    1 << (usize::BITS - 1 - n.leading_zeros())
}
