// vim: tw=80
//! Maximum bipartite matching between container elements and matchers.
//!
//! The unordered container matchers reduce to this: element i may be
//! paired with matcher j iff matcher j accepts element i, and the match
//! succeeds iff a perfect (or, for the superset/subset forms, one-side
//! saturating) pairing exists.

/// An elements x matchers boolean edge matrix.
#[derive(Clone, Debug)]
pub(crate) struct MatchMatrix {
    rows: usize,
    cols: usize,
    bits: Vec<bool>,
}

impl MatchMatrix {
    pub(crate) fn new(rows: usize, cols: usize) -> Self {
        MatchMatrix { rows, cols, bits: vec![false; rows * cols] }
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, edge: bool) {
        self.bits[row * self.cols + col] = edge;
    }

    pub(crate) fn at(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.cols + col]
    }

    /// Computes a maximum matching with Kuhn's augmenting path algorithm.
    ///
    /// Runs in O(V * E) time, which is polynomial in the matrix size,
    /// rather than trying all pairings.  Returns (row, col) pairs in
    /// increasing row order.
    pub(crate) fn find_max_matching(&self) -> Vec<(usize, usize)> {
        let mut row_of: Vec<Option<usize>> = vec![None; self.cols];
        let mut seen = vec![false; self.cols];
        for row in 0..self.rows {
            seen.iter_mut().for_each(|s| *s = false);
            self.try_augment(row, &mut seen, &mut row_of);
        }
        let mut pairing = row_of
            .iter()
            .enumerate()
            .filter_map(|(col, row)| row.map(|r| (r, col)))
            .collect::<Vec<_>>();
        pairing.sort_unstable();
        pairing
    }

    /// Tries to assign `row` to some column, recursively evicting and
    /// reassigning previous owners along an augmenting path.
    fn try_augment(
        &self,
        row: usize,
        seen: &mut [bool],
        row_of: &mut [Option<usize>],
    ) -> bool {
        for col in 0..self.cols {
            if !self.at(row, col) || seen[col] {
                continue;
            }
            seen[col] = true;
            let free = match row_of[col] {
                None => true,
                Some(owner) => self.try_augment(owner, seen, row_of),
            };
            if free {
                row_of[col] = Some(row);
                return true;
            }
        }
        false
    }
}
