//! Random-restart Hess descent.
//!
//! Each restart draws k random centers and alternates two moves until
//! neither helps: solve the restricted model around the current
//! centers, then re-center every district on its own cost-minimizing
//! unit. Objective values strictly decrease inside a restart, so the
//! inner loop always terminates.

use rand::seq::SliceRandom;

use crate::contiguity::Contiguity;
use crate::hess::RestrictedModel;
use crate::mip::{LinExpr, Sense};
use crate::search::Matheuristic;

/// Result of one inner descent from a fixed starting center set.
pub(crate) struct DescentOutcome {
    pub ub: f64,
    pub sigma: Option<Vec<usize>>,
    /// Inner rounds that actually moved a center.
    pub recenterings: usize,
}

impl Matheuristic<'_> {
    /// Full random-restart loop. Returns the best assignment found and
    /// its objective (infinite when every restart failed).
    pub(crate) fn descent(&mut self, restarts: usize, use_cuts: bool) -> (Option<Vec<usize>>, f64) {
        let n = self.graph.node_count();

        let mut restricted =
            RestrictedModel::build(self.solver, self.population, self.lower, self.upper, self.k);
        restricted.model.set_time_limit(60.0);

        let mut nodes: Vec<usize> = (0..n).collect();
        let mut best: Option<Vec<usize>> = None;
        let mut ub = f64::INFINITY;

        for restart in 0..restarts {
            nodes.shuffle(&mut self.rng);
            let mut centers = nodes[..self.k].to_vec();

            let outcome = self.descend_from(&mut restricted, &mut centers, use_cuts);
            if outcome.ub < ub {
                if let Some(sigma) = outcome.sigma {
                    ub = outcome.ub;
                    best = Some(sigma);
                }
            }
            if self.verbose > 0 {
                println!("descent restart {restart}: incumbent = {ub:.8}");
            }
        }
        (best, ub)
    }

    /// One recentering descent from the given centers. The restricted
    /// model's constraint structure is reused across calls; only costs,
    /// the center pin, and (optionally) a fresh cut separator change.
    pub(crate) fn descend_from(
        &mut self,
        restricted: &mut RestrictedModel,
        centers: &mut Vec<usize>,
        use_cuts: bool,
    ) -> DescentOutcome {
        let n = self.graph.node_count();
        assert!(centers.len() == self.k, "need exactly {} starting centers", self.k);

        let mut iter_ub = f64::INFINITY;
        let mut iter_sigma: Option<Vec<usize>> = None;
        let mut recenterings = 0usize;

        // Random centers are usually poor: accept a loose gap first.
        restricted.model.set_mip_gap(0.1);

        loop {
            let old_iter_ub = iter_ub;
            let mut centers_changed = false;

            restricted.set_costs(self.w, centers);
            if use_cuts {
                restricted.model.clear_separators();
                let columns = restricted.columns(centers);
                Contiguity::Cut.install(
                    &mut *restricted.model,
                    columns,
                    self.graph,
                    self.population,
                    self.upper,
                );
            }

            // Pin the current centers to their own slots.
            let mut pin = LinExpr::new();
            for (slot, &j) in centers.iter().enumerate() {
                pin.add_term(restricted.x(j, slot), 1.0);
            }
            restricted.model.add_named_constr("fixCenters", pin, Sense::Eq, self.k as f64);

            let solved = match restricted.model.solve() {
                Ok(status) => status.is_solved(),
                Err(error) => {
                    eprintln!("descent: restricted solve failed: {error:#}");
                    false
                }
            };
            if solved {
                iter_ub = restricted.model.objective_value();
                if self.verbose > 1 {
                    println!("  restricted objective = {iter_ub:.8} with centers {centers:?}");
                }
            }

            restricted.model.remove_constr("fixCenters");

            if solved && iter_ub < old_iter_ub {
                let sigma = restricted.extract(centers);

                // Re-center every district on its cost-minimizing unit.
                for slot in 0..self.k {
                    let district: Vec<usize> =
                        (0..n).filter(|&i| sigma[i] == centers[slot]).collect();
                    let best_center = district.iter().copied()
                        .min_by(|&a, &b| {
                            let cost_a: f64 = district.iter().map(|&v| self.w[[v, a]]).sum();
                            let cost_b: f64 = district.iter().map(|&v| self.w[[v, b]]).sum();
                            cost_a.total_cmp(&cost_b)
                        })
                        .expect("district of a pinned center cannot be empty");

                    if centers[slot] != best_center {
                        centers[slot] = best_center;
                        centers_changed = true;
                    }
                }
                if centers_changed {
                    recenterings += 1;
                }
                iter_sigma = Some(sigma);
            }

            // Centers are reasonable from here on: demand tightness.
            restricted.model.set_mip_gap(0.0005);

            if !(iter_ub < old_iter_ub && centers_changed) {
                break;
            }
        }

        DescentOutcome { ub: iter_ub, sigma: iter_sigma, recenterings }
    }
}
