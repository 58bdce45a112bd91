//! Bound-based safe fixing.
//!
//! The evaluation's bound is what the relaxation pays with the current
//! selection. Swapping a column j into the selection costs exactly
//! `W[j] - maxW` more (out: `minW - W[j]`), and forcing a free
//! assignment (i, j) costs at least `max(0, ŵ[i][j])` on top. Whenever
//! such a branch bound exceeds the incumbent, no optimal solution lives
//! in that branch and the variable is fixed for good.

use crate::hess::FixingTables;
use crate::lagrange::Evaluation;

/// Tighten the tables from one evaluation. `clusters` partitions the
/// units (the heuristic's districts); a center proven open pulls its
/// whole cluster in. `ub` must be the objective of a known feasible
/// plan.
pub(crate) fn deduce_fixings(
    fix: &mut FixingTables,
    eval: &Evaluation,
    clusters: &[Vec<usize>],
    ub: f64,
) {
    let n = eval.selected.len();

    // Worst kept column and best spare column, ignoring entries whose
    // diagonal is already decided.
    let max_w = (0..n)
        .filter(|&j| eval.selected[j] && !fix.is_one(j, j))
        .map(|j| eval.weights[j])
        .fold(f64::NEG_INFINITY, f64::max);
    let min_w = (0..n)
        .filter(|&j| !eval.selected[j] && !fix.is_zero(j, j))
        .map(|j| eval.weights[j])
        .fold(f64::INFINITY, f64::min);

    for j in 0..n {
        if !eval.selected[j] && eval.bound + eval.weights[j] - max_w > ub {
            // Opening j at all is already too expensive.
            for i in 0..n {
                if !fix.is_zero(i, j) {
                    fix.set_zero(i, j);
                }
            }
        } else {
            for i in 0..n {
                if i == j || fix.is_zero(i, j) { continue }
                let surcharge = eval.reduced[[i, j]].max(0.0);
                let too_expensive = if eval.selected[j] {
                    eval.bound + surcharge > ub
                } else {
                    eval.bound + eval.weights[j] - max_w + surcharge > ub
                };
                if too_expensive {
                    fix.set_zero(i, j);
                }
            }
        }
    }

    // Closing a selected center costs at least `minW - W[j]`; when even
    // that exceeds the incumbent the center is open in every optimal
    // plan, and its whole cluster joins it. Entries already proven zero
    // are left alone: they are served by another center.
    for cluster in clusters {
        for &j in cluster {
            if !eval.selected[j] || eval.bound - eval.weights[j] + min_w <= ub { continue }
            if !fix.is_one(j, j) {
                fix.set_one(j, j);
            }
            for &i in cluster {
                if i != j && !fix.is_one(i, j) && !fix.is_zero(i, j) {
                    fix.set_one(i, j);
                }
            }
        }
    }
}
