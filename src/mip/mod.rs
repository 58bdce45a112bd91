//! The MIP oracle seam.
//!
//! Every driver in this crate (restricted-model heuristics, the full
//! pruned model) talks to the solver through [`MipModel`], a small
//! imperative surface: add variables, paint objective coefficients,
//! add/remove linear constraints, tune parameters, solve, read values.
//! A [`MipSolver`] hands out one fresh model session per driver; the
//! session owns the model, its variables and any lazy separators, and
//! tears everything down on drop.

mod session;

pub use session::GoodLpSolver;

/// Handle to a column of a model session. Only valid for the session
/// that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Var(pub(crate) usize);

/// Variable domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Binary,
    Continuous,
}

/// Direction of a linear constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

/// A linear expression: sum of coefficient * variable plus a constant.
/// The constant absorbs variables that fixing tables turned into 0/1.
#[derive(Clone, Debug, Default)]
pub struct LinExpr {
    pub(crate) terms: Vec<(Var, f64)>,
    pub(crate) constant: f64,
}

impl LinExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `coeff * var`.
    pub fn add_term(&mut self, var: Var, coeff: f64) {
        if coeff != 0.0 {
            self.terms.push((var, coeff));
        }
    }

    /// Add a constant offset.
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Number of variable terms.
    #[inline] pub fn len(&self) -> usize { self.terms.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.terms.is_empty() }
}

/// Terminal state of a solve. `Optimal` and `TimeLimit` carry an
/// incumbent and are the only states treated as "solved"; every other
/// state leaves the caller's incumbent untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Proven optimal (subject to the MIP gap).
    Optimal,
    /// Wall-clock limit hit with a feasible incumbent available.
    TimeLimit,
    /// Every feasible solution is at or above the cutoff.
    Cutoff,
    /// Wall-clock limit hit before any certified incumbent existed
    /// (e.g. during lazy-cut generation).
    Interrupted,
    Infeasible,
    Unbounded,
}

impl Status {
    /// Does the model hold an incumbent worth reading?
    #[inline]
    pub fn is_solved(self) -> bool {
        matches!(self, Status::Optimal | Status::TimeLimit)
    }
}

/// One violated constraint returned by a lazy separator.
#[derive(Clone, Debug)]
pub struct CutRow {
    pub expr: LinExpr,
    pub sense: Sense,
    pub rhs: f64,
}

/// A lazy-constraint generator. After each candidate incumbent the
/// session calls `separate` with the variable values (indexed by
/// `Var`); returned rows are added and the model is re-solved until no
/// separator objects.
pub trait Separator {
    fn separate(&mut self, values: &[f64]) -> Vec<CutRow>;
}

/// One MIP model session. See the module docs for the lifecycle.
pub trait MipModel {
    /// Add a variable and return its handle.
    fn add_var(&mut self, kind: VarKind, lb: f64, ub: f64, obj: f64) -> Var;

    /// Repaint a variable's objective coefficient.
    fn set_objective(&mut self, var: Var, coeff: f64);

    /// Constant added to the reported objective value (the cost of
    /// variables substituted away as constants).
    fn set_objective_constant(&mut self, constant: f64);

    /// Tighten or relax a variable's lower bound.
    fn set_lower_bound(&mut self, var: Var, lb: f64);

    /// Add an anonymous linear constraint.
    fn add_constr(&mut self, expr: LinExpr, sense: Sense, rhs: f64);

    /// Add a named constraint so it can be removed later.
    fn add_named_constr(&mut self, name: &str, expr: LinExpr, sense: Sense, rhs: f64);

    /// Remove a named constraint. Panics if the name is unknown: a
    /// driver removing a constraint it never added is a logic error.
    fn remove_constr(&mut self, name: &str);

    /// Wall-clock limit for the next solves. Backends without native
    /// support record it as advisory.
    fn set_time_limit(&mut self, seconds: f64);

    /// Relative MIP gap at which the solver may stop. Advisory on
    /// backends without native support.
    fn set_mip_gap(&mut self, gap: f64);

    /// Reject incumbents with objective at or above the cutoff;
    /// `None` clears it.
    fn set_cutoff(&mut self, cutoff: Option<f64>);

    /// Warm-start hint for a variable. Advisory.
    fn set_start(&mut self, var: Var, value: f64);

    /// Register a lazy separator for the rest of the session.
    fn add_separator(&mut self, separator: Box<dyn Separator>);

    /// Drop all registered separators (their cuts stay).
    fn clear_separators(&mut self);

    /// Solve. `Err` means the oracle itself failed (the caller treats
    /// the round as "no improvement"); an unfavourable `Status` is not
    /// an error.
    fn solve(&mut self) -> anyhow::Result<Status>;

    /// Objective value of the incumbent. Panics without one.
    fn objective_value(&self) -> f64;

    /// Value of a variable in the incumbent. Panics without one.
    fn value(&self, var: Var) -> f64;
}

/// Factory for model sessions; the dependency every heuristic accepts.
pub trait MipSolver {
    fn new_model(&self) -> Box<dyn MipModel>;
}
