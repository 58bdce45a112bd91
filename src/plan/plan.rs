//! Districting plans as center assignments.
//!
//! A plan is the map σ: unit → center. Centers map to themselves;
//! district ids for output are 1-based, numbered over centers in
//! ascending unit order.

use std::{fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use ndarray::Array2;

/// A finished districting: the assignment, its objective value, and the
/// best proven lower bound.
#[derive(Clone, Debug)]
pub struct Plan {
    pub assignment: Vec<usize>,
    pub objective: f64,
    pub bound: f64,
}

impl Plan {
    /// 1-based district id per unit, centers numbered in ascending
    /// unit order.
    pub fn labels(&self) -> Vec<usize> {
        let centers = centers_of(&self.assignment);
        let mut id_of = vec![0usize; self.assignment.len()];
        for (rank, &j) in centers.iter().enumerate() {
            id_of[j] = rank + 1;
        }
        self.assignment.iter().map(|&j| id_of[j]).collect()
    }

    /// Write the plan as one `i j` line per unit.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)
            .with_context(|| format!("[plan] Failed to create output file: {}", path.display()))?;
        for (i, label) in self.labels().iter().enumerate() {
            writeln!(file, "{i} {label}")
                .with_context(|| format!("[plan] Failed to write {}", path.display()))?;
        }
        Ok(())
    }
}

/// Total assignment cost of σ under the cost matrix.
pub(crate) fn assignment_cost(sigma: &[usize], w: &Array2<f64>) -> f64 {
    sigma.iter().enumerate().map(|(i, &j)| w[[i, j]]).sum()
}

/// Centers of σ (units mapped to themselves), ascending.
pub(crate) fn centers_of(sigma: &[usize]) -> Vec<usize> {
    (0..sigma.len()).filter(|&i| sigma[i] == i).collect()
}

/// Units of each district keyed by its center, in ascending center
/// order. Every unit lands in exactly one group.
pub(crate) fn districts_of(sigma: &[usize]) -> Vec<Vec<usize>> {
    centers_of(sigma).iter()
        .map(|&j| (0..sigma.len()).filter(|&i| sigma[i] == j).collect())
        .collect()
}

/// Does σ form a k-way partition with every center self-mapped and
/// every district population inside [lower, upper]?
pub(crate) fn is_feasible(
    sigma: &[usize],
    population: &[i64],
    lower: i64,
    upper: i64,
    k: usize,
) -> bool {
    if sigma.len() != population.len() { return false }
    if sigma.iter().any(|&j| j >= sigma.len() || sigma[j] != j) { return false }

    let centers = centers_of(sigma);
    if centers.len() != k { return false }

    centers.iter().all(|&j| {
        let pop: i64 = (0..sigma.len()).filter(|&i| sigma[i] == j).map(|i| population[i]).sum();
        lower <= pop && pop <= upper
    })
}
