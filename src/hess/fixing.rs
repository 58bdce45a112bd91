use fixedbitset::FixedBitSet;

/// Variable-fixing tables for the Hess model: `zeros[i][j]` means
/// x_{ij} is proven 0 in every optimal solution, `ones[i][j]` proven 1.
///
/// Both tables start empty and only ever accumulate. Invariants:
/// - an entry is never in both tables (attempting this panics);
/// - a one off the diagonal requires the column's diagonal to be a one
///   already (force i into district j only once j is a known center);
/// - forbidding a center wipes its whole column to zero.
#[derive(Clone, Debug)]
pub struct FixingTables {
    n: usize,
    zeros: FixedBitSet,
    ones: FixedBitSet,
}

/// Counters reported after a fixing round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixingStats {
    pub zeros: usize,
    pub ones: usize,
    pub free: usize,
    pub centers_left: usize,
}

impl FixingTables {
    /// Fresh tables with nothing fixed.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            zeros: FixedBitSet::with_capacity(n * n),
            ones: FixedBitSet::with_capacity(n * n),
        }
    }

    #[inline] pub fn len(&self) -> usize { self.n }
    #[inline] pub fn is_empty(&self) -> bool { self.n == 0 }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.n && j < self.n, "fixing index ({i}, {j}) out of range");
        self.n * i + j
    }

    /// Is x_{ij} fixed to zero?
    #[inline] pub fn is_zero(&self, i: usize, j: usize) -> bool { self.zeros.contains(self.index(i, j)) }

    /// Is x_{ij} fixed to one?
    #[inline] pub fn is_one(&self, i: usize, j: usize) -> bool { self.ones.contains(self.index(i, j)) }

    /// Is x_{ij} still an open decision?
    #[inline] pub fn is_free(&self, i: usize, j: usize) -> bool { !self.is_zero(i, j) && !self.is_one(i, j) }

    /// Fix x_{ij} to zero. Panics if it is already fixed to one.
    pub fn set_zero(&mut self, i: usize, j: usize) {
        assert!(!self.is_one(i, j), "inconsistent fixing: x[{i}][{j}] is already one");
        self.zeros.insert(self.index(i, j));
    }

    /// Fix x_{ij} to one. Panics if it is already fixed to zero, or if
    /// the column's diagonal is not a one yet (for i != j).
    pub fn set_one(&mut self, i: usize, j: usize) {
        assert!(!self.is_zero(i, j), "inconsistent fixing: x[{i}][{j}] is already zero");
        assert!(i == j || self.is_one(j, j),
            "x[{i}][{j}] fixed to one before center {j} itself");
        self.ones.insert(self.index(i, j));
    }

    /// Rule j out as a center: every x_{ij} in the column becomes zero.
    pub fn forbid_center(&mut self, j: usize) {
        for i in 0..self.n {
            self.set_zero(i, j);
        }
    }

    /// Count of diagonal entries fixed to one (centers already forced).
    pub fn forced_centers(&self) -> usize {
        (0..self.n).filter(|&j| self.is_one(j, j)).count()
    }

    /// Count of diagonal entries not fixed to zero (centers still possible).
    pub fn eligible_centers(&self) -> usize {
        (0..self.n).filter(|&j| !self.is_zero(j, j)).count()
    }

    /// Whether the tables still admit exactly k centers: no more than k
    /// forced, no fewer than k possible.
    pub fn admits_centers(&self, k: usize) -> bool {
        self.forced_centers() <= k && self.eligible_centers() >= k
    }

    /// Aggregate counters for progress reporting.
    pub fn stats(&self) -> FixingStats {
        let zeros = self.zeros.count_ones(..);
        let ones = self.ones.count_ones(..);
        FixingStats {
            zeros,
            ones,
            free: self.n * self.n - zeros - ones,
            centers_left: self.eligible_centers(),
        }
    }
}
