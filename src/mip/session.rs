//! `good_lp` implementation of the MIP oracle.
//!
//! The microlp backend has no incremental API, so the session keeps its
//! own variable/constraint store and builds a fresh `good_lp` problem on
//! every solve. Lazy separators run in a build/solve/separate loop:
//! violated rows join a cut pool and the model is re-solved until every
//! separator is silent. The cutoff is enforced here rather than in the
//! backend: a final incumbent at or above the cutoff is discarded and
//! reported as [`Status::Cutoff`].

use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use good_lp::{Expression, ResolutionError, Solution, SolverModel, default_solver, variable, variables};

use super::{CutRow, LinExpr, MipModel, MipSolver, Sense, Separator, Status, Var, VarKind};

/// Factory handing out [`GoodLpModel`] sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct GoodLpSolver;

impl MipSolver for GoodLpSolver {
    fn new_model(&self) -> Box<dyn MipModel> {
        Box::new(GoodLpModel::default())
    }
}

#[derive(Clone, Debug)]
struct VarSpec {
    kind: VarKind,
    lb: f64,
    ub: f64,
    obj: f64,
}

#[derive(Clone, Debug)]
struct ConstrSpec {
    name: Option<String>,
    expr: LinExpr,
    sense: Sense,
    rhs: f64,
}

/// One model session backed by `good_lp`.
#[derive(Default)]
pub struct GoodLpModel {
    vars: Vec<VarSpec>,
    constrs: Vec<ConstrSpec>,
    cut_pool: Vec<CutRow>,
    separators: Vec<Box<dyn Separator>>,
    objective_constant: f64,
    time_limit: Option<f64>,
    cutoff: Option<f64>,
    incumbent: Option<(Vec<f64>, f64)>,
}

enum Backend {
    Solved(Vec<f64>),
    Infeasible,
    Unbounded,
}

impl GoodLpModel {
    /// Build the stored model as a `good_lp` problem and solve it once.
    fn run_backend(&self) -> Result<Backend> {
        let mut vars = variables!();
        let handles: Vec<good_lp::Variable> = self.vars.iter()
            .map(|spec| {
                let mut def = match spec.kind {
                    VarKind::Binary => variable().binary(),
                    VarKind::Continuous => variable(),
                };
                if spec.lb.is_finite() { def = def.min(spec.lb); }
                if spec.ub.is_finite() { def = def.max(spec.ub); }
                vars.add(def)
            })
            .collect();

        let objective = self.vars.iter().zip(&handles)
            .filter(|(spec, _)| spec.obj != 0.0)
            .fold(Expression::from(0.0), |acc, (spec, &handle)| acc + spec.obj * handle);

        let mut problem = vars.minimise(objective).using(default_solver);

        let rows = self.constrs.iter()
            .map(|c| (&c.expr, c.sense, c.rhs))
            .chain(self.cut_pool.iter().map(|c| (&c.expr, c.sense, c.rhs)));
        for (expr, sense, rhs) in rows {
            let mut lhs = Expression::from(expr.constant);
            for &(var, coeff) in &expr.terms {
                lhs += coeff * handles[var.0];
            }
            problem.add_constraint(match sense {
                Sense::Le => lhs.leq(rhs),
                Sense::Ge => lhs.geq(rhs),
                Sense::Eq => lhs.eq(rhs),
            });
        }

        match problem.solve() {
            Ok(solution) => Ok(Backend::Solved(
                handles.iter().map(|&h| solution.value(h)).collect(),
            )),
            Err(ResolutionError::Infeasible) => Ok(Backend::Infeasible),
            Err(ResolutionError::Unbounded) => Ok(Backend::Unbounded),
            Err(error) => bail!("solver failure: {error}"),
        }
    }

    fn objective_of(&self, values: &[f64]) -> f64 {
        self.objective_constant
            + self.vars.iter().zip(values).map(|(spec, &v)| spec.obj * v).sum::<f64>()
    }
}

impl MipModel for GoodLpModel {
    fn add_var(&mut self, kind: VarKind, lb: f64, ub: f64, obj: f64) -> Var {
        self.vars.push(VarSpec { kind, lb, ub, obj });
        Var(self.vars.len() - 1)
    }

    fn set_objective(&mut self, var: Var, coeff: f64) {
        self.vars[var.0].obj = coeff;
    }

    fn set_objective_constant(&mut self, constant: f64) {
        self.objective_constant = constant;
    }

    fn set_lower_bound(&mut self, var: Var, lb: f64) {
        self.vars[var.0].lb = lb;
    }

    fn add_constr(&mut self, expr: LinExpr, sense: Sense, rhs: f64) {
        self.constrs.push(ConstrSpec { name: None, expr, sense, rhs });
    }

    fn add_named_constr(&mut self, name: &str, expr: LinExpr, sense: Sense, rhs: f64) {
        self.constrs.push(ConstrSpec { name: Some(name.to_owned()), expr, sense, rhs });
    }

    fn remove_constr(&mut self, name: &str) {
        let at = self.constrs.iter()
            .position(|c| c.name.as_deref() == Some(name))
            .unwrap_or_else(|| panic!("no constraint named '{name}' in this session"));
        self.constrs.remove(at);
    }

    fn set_time_limit(&mut self, seconds: f64) {
        self.time_limit = Some(seconds);
    }

    /// microlp runs every solve to proven optimality; there is no gap
    /// knob to tune, so the setting is accepted and dropped.
    fn set_mip_gap(&mut self, _gap: f64) {}

    fn set_cutoff(&mut self, cutoff: Option<f64>) {
        self.cutoff = cutoff;
    }

    /// microlp cold-starts every solve; warm-start hints are accepted
    /// and dropped.
    fn set_start(&mut self, _var: Var, _value: f64) {}

    fn add_separator(&mut self, separator: Box<dyn Separator>) {
        self.separators.push(separator);
    }

    fn clear_separators(&mut self) {
        self.separators.clear();
    }

    fn solve(&mut self) -> Result<Status> {
        self.incumbent = None;
        let deadline = self.time_limit
            .map(|seconds| Instant::now() + Duration::from_secs_f64(seconds));

        let values = loop {
            let values = match self.run_backend()? {
                Backend::Solved(values) => values,
                Backend::Infeasible => return Ok(Status::Infeasible),
                Backend::Unbounded => return Ok(Status::Unbounded),
            };

            let mut violated: Vec<CutRow> = Vec::new();
            for separator in &mut self.separators {
                violated.extend(separator.separate(&values));
            }
            if violated.is_empty() {
                break values;
            }
            self.cut_pool.extend(violated);

            // A candidate that still violates lazy rows is not feasible
            // for the true model, so hitting the limit here leaves no
            // certified incumbent to hand back.
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(Status::Interrupted);
            }
        };

        let objective = self.objective_of(&values);
        if let Some(cutoff) = self.cutoff {
            if objective >= cutoff - 1e-9 {
                return Ok(Status::Cutoff);
            }
        }
        self.incumbent = Some((values, objective));
        Ok(Status::Optimal)
    }

    fn objective_value(&self) -> f64 {
        self.incumbent.as_ref().expect("no incumbent: model not solved").1
    }

    fn value(&self, var: Var) -> f64 {
        self.incumbent.as_ref().expect("no incumbent: model not solved").0[var.0]
    }
}
