//! Lazy component cuts.
//!
//! On each candidate incumbent, every open center column is scanned for
//! units assigned to it but disconnected from it inside the district.
//! For such a unit s with stranded component R, the row
//! `x_sj <= sum of x_uj over the neighborhood of R` forces the district
//! either to absorb a connector or to drop s. The `lcut` variant prunes
//! the neighborhood to units that could share a district with s under
//! the population ceiling.

use std::sync::Arc;

use crate::graph::Graph;
use crate::hess::Column;
use crate::mip::{CutRow, LinExpr, Sense, Separator};

pub(super) struct ComponentCuts {
    columns: Vec<Column>,
    graph: Arc<Graph>,
    population: Vec<i64>,
    /// `Some(U)` restricts separators to units u with p[u] + p[s] <= U.
    upper: Option<i64>,
}

impl ComponentCuts {
    pub(super) fn new(
        columns: Vec<Column>,
        graph: Arc<Graph>,
        population: Vec<i64>,
        upper: Option<i64>,
    ) -> Self {
        Self { columns, graph, population, upper }
    }
}

impl Separator for ComponentCuts {
    fn separate(&mut self, values: &[f64]) -> Vec<CutRow> {
        let n = self.graph.node_count();
        let mut cuts = Vec::new();

        for column in &self.columns {
            let j = column.center;
            if column.cells[j].value_in(values) < 0.5 { continue }

            let assigned: Vec<bool> = (0..n)
                .map(|i| column.cells[i].value_in(values) > 0.5)
                .collect();

            // Everything reachable from the center stays; the rest of
            // the district is stranded, one component at a time.
            let mut kept = vec![false; n];
            for u in self.graph.component_within(j, &assigned) {
                kept[u] = true;
            }

            let mut handled = kept.clone();
            for i in 0..n {
                if !assigned[i] || handled[i] { continue }

                let stranded = self.graph.component_within(i, &assigned);
                let mut in_stranded = vec![false; n];
                for &u in &stranded {
                    in_stranded[u] = true;
                    handled[u] = true;
                }

                // Neighborhood of the stranded component: the only
                // units that could reconnect it to the center.
                let mut ring: Vec<usize> = stranded.iter()
                    .flat_map(|&u| self.graph.edges(u))
                    .filter(|&v| !in_stranded[v])
                    .collect();
                ring.sort_unstable();
                ring.dedup();

                for &s in &stranded {
                    let connectors = ring.iter().copied().filter(|&u| {
                        self.upper
                            .map_or(true, |cap| self.population[u] + self.population[s] <= cap)
                    });

                    let mut row = LinExpr::new();
                    column.cells[s].add_to(&mut row, 1.0);
                    for u in connectors {
                        column.cells[u].add_to(&mut row, -1.0);
                    }
                    cuts.push(CutRow { expr: row, sense: Sense::Le, rhs: 0.0 });
                }
            }
        }
        cuts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contiguity::Contiguity;
    use crate::hess::{Cell, FixingTables, FullModel, cost_matrix};
    use crate::mip::GoodLpSolver;
    use ndarray::Array2;

    fn tricky_instance() -> (Arc<Graph>, Vec<i64>, Array2<f64>) {
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
        (graph, population, w)
    }

    fn is_contiguous(graph: &Graph, sigma: &[usize]) -> bool {
        let centers: Vec<usize> = (0..sigma.len()).filter(|&i| sigma[i] == i).collect();
        centers.iter().all(|&j| {
            let members: Vec<bool> = sigma.iter().map(|&c| c == j).collect();
            graph.component_within(j, &members).len() == members.iter().filter(|&&m| m).count()
        })
    }

    #[test]
    fn separator_flags_a_stranded_unit() {
        let (graph, population, w) = tricky_instance();
        let fix = FixingTables::new(4);
        let full = FullModel::build(&GoodLpSolver, &w, &population, 20, 20, 2, &fix);

        let mut separator =
            ComponentCuts::new(full.columns(), Arc::clone(&graph), population.clone(), None);

        let candidate = |pairs: &[(usize, usize)]| {
            let mut values = vec![0.0; 4 * 4 + 4]; // 16 binaries + 4 aux columns
            for &(i, j) in pairs {
                if let Cell::Var(v) = full.cell(i, j) {
                    values[v.0] = 1.0;
                }
            }
            values
        };

        // Districts {0, 2} around 0 and {1, 3} around 3: both stranded.
        let split = candidate(&[(0, 0), (2, 0), (3, 3), (1, 3)]);
        let cuts = separator.separate(&split);
        assert_eq!(cuts.len(), 2); // one per stranded unit (2 into 0, 1 into 3)

        // A contiguous candidate draws no cuts.
        let joined = candidate(&[(0, 0), (1, 0), (2, 2), (3, 2)]);
        assert!(separator.separate(&joined).is_empty());
    }

    #[test]
    fn lazy_cut_solve_restores_contiguity() {
        for enforcer in [Contiguity::Cut, Contiguity::Lcut] {
            let (graph, population, w) = tricky_instance();
            let fix = FixingTables::new(4);
            let mut full = FullModel::build(&GoodLpSolver, &w, &population, 20, 20, 2, &fix);

            let columns = full.columns();
            enforcer.install(&mut *full.model, columns, &graph, &population, 20);

            let status = full.model.solve().unwrap();
            assert!(status.is_solved());
            let sigma = full.extract();
            assert!(is_contiguous(&graph, &sigma), "{enforcer} left {sigma:?} disconnected");
        }
    }

    #[test]
    fn population_pruning_drops_oversized_connectors() {
        // Line 0-1-2 where unit 1 is huge: with U = 25 the pair {1, s}
        // can never share a district, so the lcut row for a stranded
        // unit 2 (relative to center 0) has an empty separator.
        let graph = Arc::new(Graph::from_edge_list(3, &[(0, 1), (1, 2)]));
        let population = vec![10i64, 20, 10];
        let columns = vec![Column {
            center: 0,
            cells: vec![
                Cell::Var(crate::mip::Var(0)),
                Cell::Var(crate::mip::Var(1)),
                Cell::Var(crate::mip::Var(2)),
            ],
        }];

        let values = vec![1.0, 0.0, 1.0]; // 0 and 2 assigned to 0; 1 elsewhere
        let mut plain = ComponentCuts::new(columns.clone(), Arc::clone(&graph), population.clone(), None);
        let mut pruned = ComponentCuts::new(columns, Arc::clone(&graph), population, Some(25));

        let unrestricted = plain.separate(&values);
        assert_eq!(unrestricted.len(), 1);
        assert_eq!(unrestricted[0].expr.len(), 2); // x_20 and the connector x_10

        let restricted = pruned.separate(&values);
        assert_eq!(restricted.len(), 1);
        assert_eq!(restricted[0].expr.len(), 1); // connector pruned: row forces x_20 = 0
    }
}
