//! End-to-end driver: heuristic pipeline for the upper bound,
//! subgradient ascent with safe fixing for the lower bound, then one
//! pruned full Hess solve under the configured contiguity enforcer.

use std::sync::Arc;

use anyhow::{Result, ensure};
use ndarray::Array2;

use crate::contiguity::Contiguity;
use crate::graph::Graph;
use crate::hess::{FixingTables, FullModel, cost_matrix};
use crate::lagrange::{Relaxation, ascend};
use crate::mip::{MipSolver, Status};
use crate::plan::{Plan, assignment_cost, districts_of};
use crate::search::Matheuristic;

/// A districting instance: contact graph, unit populations, pairwise
/// distances in milli-units, the population band [lower, upper], and
/// the district count.
pub struct Instance {
    pub graph: Arc<Graph>,
    pub population: Vec<i64>,
    pub distance: Array2<i64>,
    pub lower: i64,
    pub upper: i64,
    pub districts: usize,
}

impl Instance {
    pub fn new(
        graph: Graph,
        population: Vec<i64>,
        distance: Array2<i64>,
        lower: i64,
        upper: i64,
        districts: usize,
    ) -> Result<Self> {
        let n = graph.node_count();
        ensure!(n > 0, "instance has no units");
        ensure!(population.len() == n, "population has {} entries, expected {n}", population.len());
        ensure!(distance.dim() == (n, n), "distance matrix must be {n}x{n}");
        ensure!(population.iter().all(|&p| p > 0), "unit populations must be positive");
        ensure!(lower >= 1 && lower <= upper, "need 1 <= lower <= upper");
        ensure!(districts >= 1 && districts <= n, "district count must be in 1..={n}");

        Ok(Self {
            graph: Arc::new(graph),
            population,
            distance,
            lower,
            upper,
            districts,
        })
    }
}

/// Knobs for one solve. `Default` matches the CLI defaults.
#[derive(Clone, Copy, Debug)]
pub struct SolveOptions {
    /// Contiguity enforcer for the repair phase and the final model.
    pub contiguity: Contiguity,
    /// Random restarts of the Hess descent.
    pub restarts: usize,
    /// Lazy component cuts inside the descent itself.
    pub descent_cuts: bool,
    /// Subgradient rounds against the heuristic incumbent.
    pub ascent_rounds: usize,
    /// RNG seed for the restarts.
    pub seed: u64,
    /// 0 silent, 1 progress, 2 chatty.
    pub verbose: u8,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            contiguity: Contiguity::Shir,
            restarts: 10,
            descent_cuts: false,
            ascent_rounds: 300,
            seed: 0,
            verbose: 0,
        }
    }
}

/// Outcome of a solve: a plan, or a proof that none exists.
pub enum SolveOutcome {
    Solved(Plan),
    Infeasible,
}

/// Compute an optimal districting for the instance.
///
/// Returns `Infeasible` when the graph is disconnected or no partition
/// fits the population band; `Err` only on oracle failures with no
/// usable fallback.
pub fn solve(
    instance: &Instance,
    options: &SolveOptions,
    solver: &dyn MipSolver,
) -> Result<SolveOutcome> {
    let n = instance.graph.node_count();
    let k = instance.districts;

    if !instance.graph.is_connected() {
        return Ok(SolveOutcome::Infeasible);
    }

    let w = cost_matrix(&instance.population, &instance.distance);

    // Upper bound: descent, then repair to contiguity, then swaps.
    let mut heuristic = Matheuristic::new(
        &instance.graph,
        &w,
        &instance.population,
        instance.lower,
        instance.upper,
        k,
        solver,
        options.contiguity,
        options.seed,
        options.verbose,
    );

    let (mut sigma, mut ub) = heuristic.descent(options.restarts, options.descent_cuts);
    if let Some(assignment) = sigma.as_mut() {
        heuristic.repair(assignment, &mut ub);
        heuristic.local_search(assignment, &mut ub);
    }
    if options.verbose > 0 {
        match &sigma {
            Some(_) => println!("heuristic incumbent = {ub:.8}"),
            None => println!("heuristic found no feasible plan"),
        }
    }

    // Lower bound and fixings, driven by the incumbent.
    let mut fix = FixingTables::new(n);
    let mut bound = f64::NEG_INFINITY;
    if let Some(assignment) = &sigma {
        if ub.is_finite() {
            let clusters = districts_of(assignment);
            let relax = Relaxation {
                w: &w,
                population: &instance.population,
                lower: instance.lower,
                upper: instance.upper,
                k,
            };
            let report = ascend(
                &relax,
                &mut fix,
                &clusters,
                ub,
                options.ascent_rounds,
                options.verbose,
            );
            bound = report.bound;

            if !fix.admits_centers(k) {
                // The tables rule out every alternative: the incumbent
                // is optimal.
                return Ok(SolveOutcome::Solved(Plan {
                    assignment: assignment.clone(),
                    objective: ub,
                    bound: ub,
                }));
            }
        }
    }

    // Final pruned full model under the contiguity enforcer.
    let mut full = FullModel::build(
        solver,
        &w,
        &instance.population,
        instance.lower,
        instance.upper,
        k,
        &fix,
    );
    if full.fathomed {
        return match sigma {
            Some(assignment) => Ok(SolveOutcome::Solved(Plan { assignment, objective: ub, bound: ub })),
            None => Ok(SolveOutcome::Infeasible),
        };
    }

    let columns = full.columns();
    options.contiguity.install(
        &mut *full.model,
        columns,
        &instance.graph,
        &instance.population,
        instance.upper,
    );
    if let Some(assignment) = &sigma {
        full.warm_start(assignment);
    }

    match full.model.solve() {
        Ok(status) if status.is_solved() => {
            let objective = full.model.objective_value();
            let assignment = full.extract();
            // A proven-optimal solve closes the gap; a limit-hit solve
            // keeps whatever the ascent proved.
            let bound = if status == Status::Optimal { objective } else { bound };
            Ok(SolveOutcome::Solved(Plan { assignment, objective, bound }))
        }
        Ok(status) => {
            // Infeasible or interrupted full model: fall back to the
            // heuristic plan when one exists.
            match sigma {
                Some(assignment) => {
                    eprintln!("full model not solved ({status:?}); reporting heuristic plan");
                    Ok(SolveOutcome::Solved(Plan { assignment, objective: ub, bound }))
                }
                None => Ok(SolveOutcome::Infeasible),
            }
        }
        Err(error) => match sigma {
            Some(assignment) => {
                eprintln!("full solve failed: {error:#}; reporting heuristic plan");
                Ok(SolveOutcome::Solved(Plan { assignment, objective: ub, bound }))
            }
            None => Err(error),
        },
    }
}

/// Objective of an assignment under this instance's cost oracle.
/// Exposed for reporting and tests.
pub fn plan_cost(instance: &Instance, assignment: &[usize]) -> f64 {
    let w = cost_matrix(&instance.population, &instance.distance);
    assignment_cost(assignment, &w)
}
