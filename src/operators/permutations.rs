//! Distinct permutations of a route.
//!
//! A route holds every cargo id exactly twice, so most of its `n!` orderings
//! are duplicates. Walking the multiset in lexicographic order visits each
//! distinct ordering exactly once: `n! / 2^(n/2)` routes for `n` calls, so
//! callers keep `n` small.

/// Iterator over the distinct orderings of a multiset of call ids.
pub struct DistinctPermutations {
    current: Vec<usize>,
    done: bool,
}

impl DistinctPermutations {
    pub fn new(calls: &[usize]) -> Self {
        let mut current = calls.to_vec();
        current.sort_unstable();
        DistinctPermutations {
            current,
            done: false,
        }
    }
}

impl Iterator for DistinctPermutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let item = self.current.clone();
        self.done = !next_permutation(&mut self.current);
        Some(item)
    }
}

/// Advance `items` to the next lexicographic permutation.
/// Returns `false` once the last permutation has been reached.
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }

    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }

    let mut j = items.len() - 1;
    while items[j] <= items[i - 1] {
        j -= 1;
    }
    items.swap(i - 1, j);
    items[i..].reverse();
    true
}
