//! Center-swap local search.
//!
//! For each center v and graph neighbor u, the swap v -> u is tried on
//! the restricted model by transiently repainting v's column to u's
//! costs and shifting the pin from v to u, with the current upper bound
//! as cutoff. Improving swaps are committed and the scan restarts. A
//! set of sorted-center fingerprints guarantees every center set is
//! solved at most once across the whole run.

use std::collections::HashSet;

use crate::hess::RestrictedModel;
use crate::plan::centers_of;
use crate::search::Matheuristic;

impl Matheuristic<'_> {
    /// Improve `sigma`/`ub` by single-center swaps until a full pass
    /// yields nothing. Returns false when the input is unusable.
    pub(crate) fn local_search(&mut self, sigma: &mut Vec<usize>, ub: &mut f64) -> bool {
        let n = self.graph.node_count();
        if sigma.len() != n {
            eprintln!("local search: no assignment to improve; bailing out");
            return false;
        }

        let mut centers = centers_of(sigma);
        if centers.len() != self.k {
            eprintln!("local search: assignment has {} centers, expected {}; bailing out", centers.len(), self.k);
            return false;
        }
        if self.verbose > 0 {
            println!("local search: starting from ub = {ub:.8}");
        }

        let mut seen: HashSet<Vec<usize>> = HashSet::new();

        let mut restricted =
            RestrictedModel::build(self.solver, self.population, self.lower, self.upper, self.k);
        restricted.set_costs(self.w, &centers);
        restricted.model.set_time_limit(60.0);

        // Pin every center into its own slot.
        for (slot, &j) in centers.iter().enumerate() {
            let var = restricted.x(j, slot);
            restricted.model.set_lower_bound(var, 1.0);
        }

        loop {
            let mut improvement = false;

            'scan: for slot in 0..self.k {
                let v = centers[slot];
                let neighbors: Vec<usize> = self.graph.edges(v).collect();

                for u in neighbors {
                    if centers.contains(&u) { continue }

                    // Solve each center set at most once, ever.
                    let mut fingerprint = centers.clone();
                    fingerprint[slot] = u;
                    fingerprint.sort_unstable();
                    if !seen.insert(fingerprint) {
                        if self.verbose > 1 {
                            println!("  skipping already-tried centers");
                        }
                        continue;
                    }

                    // Transiently make slot the u-column.
                    let (from_v, into_u) = (restricted.x(v, slot), restricted.x(u, slot));
                    for i in 0..n {
                        let var = restricted.x(i, slot);
                        restricted.model.set_objective(var, self.w[[i, u]]);
                    }
                    restricted.model.set_lower_bound(from_v, 0.0);
                    restricted.model.set_lower_bound(into_u, 1.0);
                    restricted.model.set_cutoff(Some(*ub));

                    let outcome = restricted.model.solve();

                    // Revert before interpreting the outcome.
                    for i in 0..n {
                        let var = restricted.x(i, slot);
                        restricted.model.set_objective(var, self.w[[i, v]]);
                    }
                    restricted.model.set_lower_bound(from_v, 1.0);
                    restricted.model.set_lower_bound(into_u, 0.0);

                    let solved = match outcome {
                        Ok(status) => status.is_solved(),
                        Err(error) => {
                            eprintln!("local search: solve failed: {error:#}");
                            false
                        }
                    };
                    if !solved { continue }

                    let new_ub = restricted.model.objective_value();
                    if new_ub < *ub {
                        // Commit: slot now belongs to u for good.
                        *ub = new_ub;
                        centers[slot] = u;
                        for i in 0..n {
                            let var = restricted.x(i, slot);
                            restricted.model.set_objective(var, self.w[[i, u]]);
                        }
                        restricted.model.set_lower_bound(from_v, 0.0);
                        restricted.model.set_lower_bound(into_u, 1.0);
                        *sigma = restricted.extract(&centers);

                        if self.verbose > 0 {
                            println!("local search: improved to {new_ub:.8} with centers {centers:?}");
                        }
                        improvement = true;
                        break 'scan;
                    }
                }
            }

            if !improvement { break }
        }

        restricted.model.set_cutoff(None);
        true
    }
}
