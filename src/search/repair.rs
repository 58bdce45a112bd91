//! Connectivity repair.
//!
//! The descent assignment need not induce connected districts. This
//! phase keeps each district's component around its center, installs
//! the configured contiguity enforcer on a restricted model, warm-starts
//! from those components, and re-solves. On success the assignment and
//! upper bound are overwritten with the contiguous result.

use crate::hess::RestrictedModel;
use crate::plan::centers_of;
use crate::search::Matheuristic;

impl Matheuristic<'_> {
    /// Repair `sigma` into contiguous districts. Leaves `sigma`/`ub`
    /// untouched when the enforced model cannot be solved.
    pub(crate) fn repair(&mut self, sigma: &mut Vec<usize>, ub: &mut f64) {
        let n = self.graph.node_count();
        assert!(sigma.len() == n, "sigma.len() must equal node count");

        let centers = centers_of(sigma);
        if centers.len() != self.k {
            eprintln!("repair: assignment has {} centers, expected {}; bailing out", centers.len(), self.k);
            return;
        }

        // Component of each center within its own district, and the
        // component's interior (every neighbor inside it too).
        let mut kept: Vec<Vec<usize>> = Vec::with_capacity(self.k);
        let mut interior: Vec<Vec<usize>> = Vec::with_capacity(self.k);
        for &j in &centers {
            let members: Vec<bool> = sigma.iter().map(|&c| c == j).collect();
            let component = self.graph.component_within(j, &members);

            let mut in_component = vec![false; n];
            for &u in &component {
                in_component[u] = true;
            }
            interior.push(
                component.iter().copied()
                    .filter(|&u| self.graph.edges(u).all(|v| in_component[v]))
                    .collect(),
            );
            kept.push(component);
        }

        let mut restricted =
            RestrictedModel::build(self.solver, self.population, self.lower, self.upper, self.k);
        restricted.set_costs(self.w, &centers);
        restricted.model.set_time_limit(3600.0);

        let columns = restricted.columns(&centers);
        self.contiguity.install(
            &mut *restricted.model,
            columns,
            self.graph,
            self.population,
            self.upper,
        );

        // Warm start from the kept components and pin the centers.
        for (slot, component) in kept.iter().enumerate() {
            for &i in component {
                let var = restricted.x(i, slot);
                restricted.model.set_start(var, 1.0);
            }
        }
        for (slot, &j) in centers.iter().enumerate() {
            let var = restricted.x(j, slot);
            restricted.model.set_lower_bound(var, 1.0);
        }

        // On larger instances the interiors are safe to pin as well;
        // they cannot be the frontier of any reshuffle.
        if n >= 200 {
            for (slot, units) in interior.iter().enumerate() {
                for &i in units {
                    let var = restricted.x(i, slot);
                    restricted.model.set_lower_bound(var, 1.0);
                }
            }
        }

        match restricted.model.solve() {
            Ok(status) if status.is_solved() => {
                *ub = restricted.model.objective_value();
                *sigma = restricted.extract(&centers);
                if self.verbose > 0 {
                    println!("repair: contiguous incumbent = {ub:.8} with centers {centers:?}");
                }
            }
            Ok(status) => {
                eprintln!("repair: enforced model not solved ({status:?}); keeping previous assignment");
            }
            Err(error) => {
                eprintln!("repair: solve failed: {error:#}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contiguity::Contiguity;
    use crate::graph::Graph;
    use crate::hess::cost_matrix;
    use crate::mip::GoodLpSolver;
    use crate::plan::assignment_cost;
    use ndarray::Array2;
    use std::sync::Arc;

    fn is_contiguous(graph: &Graph, sigma: &[usize]) -> bool {
        centers_of(sigma).iter().all(|&j| {
            let members: Vec<bool> = sigma.iter().map(|&c| c == j).collect();
            graph.component_within(j, &members).len() == members.iter().filter(|&&m| m).count()
        })
    }

    #[test]
    fn repairs_a_split_assignment() {
        // Path 0-1-2-3 with teleport-cheap pairs: the cheap assignment
        // (0,3,0,3) is discontiguous; repair must land on a contiguous
        // partition and report its true cost.
        let graph = Arc::new(Graph::from_edge_list(4, &[(0, 1), (1, 2), (2, 3)]));
        let population = vec![10i64; 4];
        let mut dist = Array2::<i64>::zeros((4, 4));
        for i in 0..4 {
            for j in 0..4 {
                dist[[i, j]] = 1000 * (i as i64 - j as i64).abs();
            }
        }
        dist[[2, 0]] = 100;
        dist[[1, 3]] = 100;
        let w = cost_matrix(&population, &dist);

        for enforcer in [Contiguity::Shir, Contiguity::Mcf, Contiguity::Cut, Contiguity::Lcut] {
            let mut heuristic = Matheuristic::new(
                &graph, &w, &population, 20, 20, 2,
                &GoodLpSolver, enforcer, 1, 0,
            );

            let mut sigma = vec![0, 3, 0, 3];
            let mut ub = assignment_cost(&sigma, &w);
            heuristic.repair(&mut sigma, &mut ub);

            assert!(is_contiguous(&graph, &sigma), "{enforcer} left {sigma:?} split");
            assert!((ub - assignment_cost(&sigma, &w)).abs() < 1e-6);
            // Best contiguous split keeps the end pairs together.
            assert!((ub - 20.0).abs() < 1e-6, "{enforcer} gave ub = {ub}");
        }
    }

    #[test]
    fn wrong_center_count_bails_out() {
        let graph = Arc::new(Graph::from_edge_list(2, &[(0, 1)]));
        let population = vec![10i64; 2];
        let w = cost_matrix(&population, &Array2::<i64>::zeros((2, 2)));

        let mut heuristic = Matheuristic::new(
            &graph, &w, &population, 10, 10, 2,
            &GoodLpSolver, Contiguity::Shir, 1, 0,
        );

        // σ maps everything to 0: one center, not two.
        let mut sigma = vec![0, 0];
        let mut ub = 123.0;
        heuristic.repair(&mut sigma, &mut ub);

        assert_eq!(sigma, vec![0, 0]);
        assert_eq!(ub, 123.0);
    }
}
