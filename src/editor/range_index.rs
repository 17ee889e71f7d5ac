//! Interval index over element ranges.
//!
//! A static, implicitly balanced interval tree: entries are sorted by start
//! offset and every node of the implicit binary tree over that array stores
//! the largest end offset in its subtree. Queries prune subtrees that end
//! before the query or start after it, so a query costs O(k + log n) for
//! typical editor documents where spans rarely nest deeply.

use std::ops::Range;

#[derive(Debug, Clone, Default)]
pub struct RangeIndex {
    /// (range, payload) sorted by range start, then end
    entries: Vec<(Range<usize>, usize)>,
    /// Max end offset of the implicit subtree rooted at each position
    subtree_max: Vec<usize>,
}

impl RangeIndex {
    /// Build the index. `payload` is typically the element's position in its
    /// owning vector.
    pub fn build(ranges: impl IntoIterator<Item = (Range<usize>, usize)>) -> Self {
        let mut entries: Vec<(Range<usize>, usize)> = ranges.into_iter().collect();
        entries.sort_by(|a, b| (a.0.start, a.0.end, a.1).cmp(&(b.0.start, b.0.end, b.1)));
        let mut subtree_max = vec![0; entries.len()];
        Self::fill_max(&entries, &mut subtree_max, 0, entries.len());
        Self {
            entries,
            subtree_max,
        }
    }

    fn fill_max(
        entries: &[(Range<usize>, usize)],
        subtree_max: &mut [usize],
        lo: usize,
        hi: usize,
    ) -> usize {
        if lo >= hi {
            return 0;
        }
        let mid = lo + (hi - lo) / 2;
        let left = Self::fill_max(entries, subtree_max, lo, mid);
        let right = Self::fill_max(entries, subtree_max, mid + 1, hi);
        let max = entries[mid].0.end.max(left).max(right);
        subtree_max[mid] = max;
        max
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Payloads of every entry intersecting `query`, in start order.
    ///
    /// An empty query `p..p` matches entries with `start <= p < end`.
    pub fn query(&self, query: &Range<usize>) -> Vec<usize> {
        let query = if query.start >= query.end {
            query.start..query.start + 1
        } else {
            query.clone()
        };
        let mut out = Vec::new();
        self.collect(0, self.entries.len(), &query, &mut out);
        out
    }

    fn collect(&self, lo: usize, hi: usize, query: &Range<usize>, out: &mut Vec<usize>) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        if self.subtree_max[mid] <= query.start {
            return;
        }

        self.collect(lo, mid, query, out);

        let (range, payload) = &self.entries[mid];
        if range.start >= query.end {
            return;
        }
        if query.start < range.end {
            out.push(*payload);
        }
        self.collect(mid + 1, hi, query, out);
    }
}
