//! Builders for the two Hess MIPs.
//!
//! The restricted model covers a fixed center set: one column per
//! center *slot*, so the same session can be re-targeted to a new
//! center set by repainting objective coefficients without touching the
//! constraint structure. The full model covers every (i, j) pair the
//! fixing tables leave open; fixed pairs are substituted as constants
//! and folded into the rows and the objective.

use ndarray::Array2;

use crate::hess::FixingTables;
use crate::mip::{LinExpr, MipModel, MipSolver, Sense, Var, VarKind};

/// One x_{ij} slot as the solver sees it: substituted constant or live
/// column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Cell {
    Zero,
    One,
    Var(Var),
}

impl Cell {
    /// The slot's value under a candidate solution.
    #[inline]
    pub(crate) fn value_in(self, values: &[f64]) -> f64 {
        match self {
            Cell::Zero => 0.0,
            Cell::One => 1.0,
            Cell::Var(v) => values[v.0],
        }
    }

    /// Append this slot to a linear expression with a coefficient.
    pub(crate) fn add_to(self, expr: &mut LinExpr, coeff: f64) {
        match self {
            Cell::Zero => {}
            Cell::One => expr.add_constant(coeff),
            Cell::Var(v) => expr.add_term(v, coeff),
        }
    }
}

/// A potential-center column handed to the contiguity enforcers:
/// `cells[i]` is x_{i,center}.
#[derive(Clone, Debug)]
pub(crate) struct Column {
    pub center: usize,
    pub cells: Vec<Cell>,
}

/// Reduced Hess model over k center slots (n·k binaries).
pub(crate) struct RestrictedModel {
    pub model: Box<dyn MipModel>,
    n: usize,
    k: usize,
    x: Vec<Var>, // slot * n + i
}

impl RestrictedModel {
    /// Build the slot-structural part: assignment rows and population
    /// bands. Objective coefficients are painted by `set_costs`.
    pub fn build(
        solver: &dyn MipSolver,
        population: &[i64],
        lower: i64,
        upper: i64,
        k: usize,
    ) -> Self {
        let n = population.len();
        assert!(k >= 1 && k <= n, "k must be in 1..={n}");

        let mut model = solver.new_model();
        let x: Vec<Var> = (0..n * k)
            .map(|_| model.add_var(VarKind::Binary, 0.0, 1.0, 0.0))
            .collect();

        // (b) every unit lands in exactly one slot
        for i in 0..n {
            let mut row = LinExpr::new();
            for slot in 0..k {
                row.add_term(x[slot * n + i], 1.0);
            }
            model.add_constr(row, Sense::Eq, 1.0);
        }

        // (d) population band per slot; unconditional because the
        // slot's center is present by construction
        for slot in 0..k {
            let mut load = LinExpr::new();
            for i in 0..n {
                load.add_term(x[slot * n + i], population[i] as f64);
            }
            model.add_constr(load.clone(), Sense::Le, upper as f64);
            model.add_constr(load, Sense::Ge, lower as f64);
        }

        Self { model, n, k, x }
    }

    #[inline] pub fn n(&self) -> usize { self.n }
    #[inline] pub fn k(&self) -> usize { self.k }

    /// Variable for unit `i` in center slot `slot`.
    #[inline]
    pub fn x(&self, i: usize, slot: usize) -> Var {
        assert!(i < self.n && slot < self.k, "x({i}, slot {slot}) out of range");
        self.x[slot * self.n + i]
    }

    /// Re-target the model to a new center set by repainting the
    /// objective of every slot column.
    pub fn set_costs(&mut self, w: &Array2<f64>, centers: &[usize]) {
        assert!(centers.len() == self.k, "need exactly {} centers", self.k);
        for (slot, &j) in centers.iter().enumerate() {
            for i in 0..self.n {
                let var = self.x(i, slot);
                self.model.set_objective(var, w[[i, j]]);
            }
        }
    }

    /// Column view for the contiguity enforcers under a center set.
    pub fn columns(&self, centers: &[usize]) -> Vec<Column> {
        assert!(centers.len() == self.k, "need exactly {} centers", self.k);
        centers.iter().enumerate()
            .map(|(slot, &j)| Column {
                center: j,
                cells: (0..self.n).map(|i| Cell::Var(self.x(i, slot))).collect(),
            })
            .collect()
    }

    /// Read the assignment out of the incumbent: σ(i) = centers[slot]
    /// for the slot with x_{i,slot} > 0.5.
    pub fn extract(&self, centers: &[usize]) -> Vec<usize> {
        (0..self.n)
            .map(|i| {
                let slot = (0..self.k)
                    .find(|&slot| self.model.value(self.x(i, slot)) > 0.5)
                    .unwrap_or_else(|| panic!("unit {i} unassigned in incumbent"));
                centers[slot]
            })
            .collect()
    }
}

/// Full Hess model over all pairs the fixing tables leave open.
pub(crate) struct FullModel {
    pub model: Box<dyn MipModel>,
    n: usize,
    cells: Vec<Cell>, // n * i + j
    /// The fixings wiped out an entire assignment or center row: no
    /// solution beats the bounds that produced them, so the incumbent
    /// that drove the fixing is already optimal.
    pub fathomed: bool,
}

impl FullModel {
    pub fn build(
        solver: &dyn MipSolver,
        w: &Array2<f64>,
        population: &[i64],
        lower: i64,
        upper: i64,
        k: usize,
        fix: &FixingTables,
    ) -> Self {
        let n = population.len();
        assert!(fix.len() == n, "fixing tables sized {} but n = {n}", fix.len());
        assert!(k >= 1 && k <= n, "k must be in 1..={n}");

        let mut model = solver.new_model();
        let mut fathomed = false;

        let mut fixed_cost = 0.0;
        let cells: Vec<Cell> = (0..n * n)
            .map(|idx| {
                let (i, j) = (idx / n, idx % n);
                if fix.is_zero(i, j) {
                    Cell::Zero
                } else if fix.is_one(i, j) {
                    fixed_cost += w[[i, j]];
                    Cell::One
                } else {
                    Cell::Var(model.add_var(VarKind::Binary, 0.0, 1.0, w[[i, j]]))
                }
            })
            .collect();
        model.set_objective_constant(fixed_cost);

        let cell = |i: usize, j: usize| cells[n * i + j];
        let mut push = |model: &mut Box<dyn MipModel>, expr: LinExpr, sense: Sense, rhs: f64| {
            if expr.is_empty() {
                // Row fully substituted; nothing to post, but an
                // unsatisfied constant means the model is fathomed.
                let gap = expr.constant - rhs;
                let violated = match sense {
                    Sense::Le => gap > 1e-9,
                    Sense::Ge => gap < -1e-9,
                    Sense::Eq => gap.abs() > 1e-9,
                };
                if violated { fathomed = true; }
            } else {
                model.add_constr(expr, sense, rhs);
            }
        };

        // (b) every unit assigned exactly once
        for i in 0..n {
            let mut row = LinExpr::new();
            for j in 0..n {
                cell(i, j).add_to(&mut row, 1.0);
            }
            push(&mut model, row, Sense::Eq, 1.0);
        }

        // (c) exactly k centers
        let mut diag = LinExpr::new();
        for j in 0..n {
            cell(j, j).add_to(&mut diag, 1.0);
        }
        push(&mut model, diag, Sense::Eq, k as f64);

        // (d) district populations through an auxiliary q_j, which
        // keeps the coupling rows at two nonzeros each
        for j in 0..n {
            if fix.is_zero(j, j) { continue }
            let q = model.add_var(VarKind::Continuous, 0.0, f64::INFINITY, 0.0);

            let mut load = LinExpr::new();
            for i in 0..n {
                cell(i, j).add_to(&mut load, population[i] as f64);
            }
            load.add_term(q, -1.0);
            push(&mut model, load, Sense::Eq, 0.0);

            match cell(j, j) {
                Cell::One => {
                    let mut band = LinExpr::new();
                    band.add_term(q, 1.0);
                    model.add_constr(band.clone(), Sense::Le, upper as f64);
                    model.add_constr(band, Sense::Ge, lower as f64);
                }
                Cell::Var(xjj) => {
                    let mut up = LinExpr::new();
                    up.add_term(q, 1.0);
                    up.add_term(xjj, -(upper as f64));
                    model.add_constr(up, Sense::Le, 0.0);

                    let mut low = LinExpr::new();
                    low.add_term(q, 1.0);
                    low.add_term(xjj, -(lower as f64));
                    model.add_constr(low, Sense::Ge, 0.0);
                }
                Cell::Zero => unreachable!("column {j} both open and forbidden"),
            }
        }

        // (e) assignment implies the center is open
        for j in 0..n {
            let Cell::Var(xjj) = cell(j, j) else { continue };
            for i in 0..n {
                if i == j { continue }
                if let Cell::Var(xij) = cell(i, j) {
                    let mut row = LinExpr::new();
                    row.add_term(xij, 1.0);
                    row.add_term(xjj, -1.0);
                    model.add_constr(row, Sense::Le, 0.0);
                }
            }
        }

        Self { model, n, cells, fathomed }
    }

    #[inline] pub fn n(&self) -> usize { self.n }

    #[inline]
    pub fn cell(&self, i: usize, j: usize) -> Cell {
        assert!(i < self.n && j < self.n, "cell ({i}, {j}) out of range");
        self.cells[self.n * i + j]
    }

    /// Column view (open centers only) for the contiguity enforcers.
    pub fn columns(&self) -> Vec<Column> {
        (0..self.n)
            .filter(|&j| self.cell(j, j) != Cell::Zero)
            .map(|j| Column {
                center: j,
                cells: (0..self.n).map(|i| self.cell(i, j)).collect(),
            })
            .collect()
    }

    /// Hint the solver toward a known-good assignment.
    pub fn warm_start(&mut self, sigma: &[usize]) {
        assert!(sigma.len() == self.n, "sigma.len() must equal n");
        for (i, &j) in sigma.iter().enumerate() {
            if let Cell::Var(v) = self.cell(i, j) {
                self.model.set_start(v, 1.0);
            }
        }
    }

    /// Read σ out of the incumbent, letting substituted ones through.
    pub fn extract(&self) -> Vec<usize> {
        (0..self.n)
            .map(|i| {
                (0..self.n)
                    .find(|&j| match self.cell(i, j) {
                        Cell::Zero => false,
                        Cell::One => true,
                        Cell::Var(v) => self.model.value(v) > 0.5,
                    })
                    .unwrap_or_else(|| panic!("unit {i} unassigned in incumbent"))
            })
            .collect()
    }
}
