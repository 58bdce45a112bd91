#![doc = "Optimal political districting via the Hess model: a Lagrangian \
relaxation with safe variable fixing for lower bounds, a matheuristic \
pipeline for upper bounds, and a pruned exact solve to close the gap."]

pub mod cli;
mod contiguity;
mod graph;
mod hess;
mod io;
mod lagrange;
mod mip;
mod plan;
mod rng;
mod search;
mod solve;

#[doc(inline)]
pub use contiguity::Contiguity;

#[doc(inline)]
pub use graph::Graph;

#[doc(inline)]
pub use hess::{FixingStats, FixingTables, cost_matrix};

#[doc(inline)]
pub use io::{read_dimacs, read_distance_matrix, read_population};

#[doc(inline)]
pub use mip::{CutRow, GoodLpSolver, LinExpr, MipModel, MipSolver, Sense, Separator, Status, Var, VarKind};

#[doc(inline)]
pub use plan::Plan;

#[doc(inline)]
pub use solve::{Instance, SolveOptions, SolveOutcome, plan_cost, solve};

#[doc(inline)]
pub use rng::Mwc;
