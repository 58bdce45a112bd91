//! Upper-bound pipeline: random-restart Hess descent, connectivity
//! repair, and center-swap local search, all driving restricted models
//! through the MIP oracle.

mod descent;
mod local;
mod repair;

use std::sync::Arc;

use ndarray::Array2;

use crate::contiguity::Contiguity;
use crate::graph::Graph;
use crate::mip::MipSolver;
use crate::rng::Mwc;

/// Shared state of the heuristic phases. One instance drives the whole
/// pipeline; each phase owns its model session for exactly as long as
/// it runs.
pub(crate) struct Matheuristic<'a> {
    pub graph: &'a Arc<Graph>,
    pub w: &'a Array2<f64>,
    pub population: &'a [i64],
    pub lower: i64,
    pub upper: i64,
    pub k: usize,
    pub solver: &'a dyn MipSolver,
    pub contiguity: Contiguity,
    pub rng: Mwc,
    pub verbose: u8,
}

impl<'a> Matheuristic<'a> {
    pub fn new(
        graph: &'a Arc<Graph>,
        w: &'a Array2<f64>,
        population: &'a [i64],
        lower: i64,
        upper: i64,
        k: usize,
        solver: &'a dyn MipSolver,
        contiguity: Contiguity,
        seed: u64,
        verbose: u8,
    ) -> Self {
        assert!(population.len() == graph.node_count(), "population.len() must equal node count");
        assert!(k >= 1 && k <= graph.node_count(), "k out of range");
        Self {
            graph,
            w,
            population,
            lower,
            upper,
            k,
            solver,
            contiguity,
            rng: Mwc::new(seed),
            verbose,
        }
    }
}
