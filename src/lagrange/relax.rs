//! Multiplier evaluation.
//!
//! Dualizing the assignment rows (α) and the two population bands
//! (λ, υ) leaves a relaxation that decomposes per potential center: a
//! column j is worth its diagonal reduced cost plus every helpful
//! off-diagonal entry, and the best relaxed solution opens the k
//! lightest columns. That value is a lower bound on the optimum for
//! any multipliers, and the slacks of the dualized rows form a
//! subgradient.

use ndarray::Array2;

use crate::hess::FixingTables;

/// The instance data the relaxation reads. Multiplier layout is three
/// length-n blocks: α (assignment), λ (lower band), υ (upper band).
/// λ and υ enter through their absolute values; the matching gradient
/// entries are reflected for negative multipliers.
pub(crate) struct Relaxation<'a> {
    pub w: &'a Array2<f64>,
    pub population: &'a [i64],
    pub lower: i64,
    pub upper: i64,
    pub k: usize,
}

/// Everything one evaluation produces. `reduced` and `weights` feed
/// the safe-fixing deduction.
pub(crate) struct Evaluation {
    /// Valid lower bound on the optimal Hess objective.
    pub bound: f64,
    /// Subgradient at the evaluated multipliers, length 3n.
    pub gradient: Vec<f64>,
    /// The k selected centers.
    pub selected: Vec<bool>,
    /// Column weights W.
    pub weights: Vec<f64>,
    /// Reduced costs ŵ.
    pub reduced: Array2<f64>,
}

impl Relaxation<'_> {
    pub fn n(&self) -> usize {
        self.population.len()
    }

    /// Evaluate the dual function at `mu`.
    pub fn evaluate(&self, mu: &[f64], fix: &FixingTables) -> Evaluation {
        let n = self.n();
        assert!(mu.len() == 3 * n, "multiplier vector must have length 3n");
        assert!(fix.len() == n, "fixing tables sized {} but n = {n}", fix.len());
        assert!(fix.admits_centers(self.k), "fixings no longer admit {} centers", self.k);

        let alpha = &mu[..n];
        let lambda = &mu[n..2 * n];
        let upsilon = &mu[2 * n..];

        // Reduced costs; the diagonal correction keeps the dualized
        // bands anchored on the center's own row.
        let mut reduced = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            let p_over_l = self.population[i] as f64 / self.lower as f64;
            let p_over_u = self.population[i] as f64 / self.upper as f64;
            for j in 0..n {
                let mut value = self.w[[i, j]] - alpha[i]
                    - lambda[j].abs() * p_over_l
                    + upsilon[j].abs() * p_over_u;
                if i == j {
                    value += lambda[j].abs() - upsilon[j].abs();
                }
                reduced[[i, j]] = value;
            }
        }

        // Column weights: the value of opening j in the relaxation.
        // Fixed-to-one entries are mandatory, fixed-to-zero entries are
        // unavailable, free entries join only when they help.
        let mut weights = vec![0.0; n];
        for j in 0..n {
            let mut total = reduced[[j, j]];
            for i in 0..n {
                if i == j || fix.is_zero(i, j) { continue }
                if fix.is_one(i, j) {
                    total += reduced[[i, j]];
                } else {
                    total += reduced[[i, j]].min(0.0);
                }
            }
            weights[j] = total;
        }

        // Open the k lightest columns, with forced centers first and
        // forbidden ones last regardless of weight.
        let class = |j: usize| -> u8 {
            if fix.is_one(j, j) { 0 } else if fix.is_zero(j, j) { 2 } else { 1 }
        };
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| class(a).cmp(&class(b)).then(weights[a].total_cmp(&weights[b])));

        let mut selected = vec![false; n];
        let mut bound: f64 = alpha.iter().sum();
        for &j in &order[..self.k] {
            selected[j] = true;
            bound += weights[j];
        }

        // Subgradient: slack of each dualized row under the relaxed
        // solution, where unit i joins column j iff i = j or its
        // reduced cost is negative.
        let mut gradient = vec![0.0; 3 * n];
        for i in 0..n {
            gradient[i] = 1.0;
        }
        for &j in &order[..self.k] {
            gradient[n + j] = 1.0;
            gradient[2 * n + j] = -1.0;
            for i in 0..n {
                if i == j || reduced[[i, j]] < 0.0 {
                    gradient[i] -= 1.0;
                    gradient[n + j] -= self.population[i] as f64 / self.lower as f64;
                    gradient[2 * n + j] += self.population[i] as f64 / self.upper as f64;
                }
            }
        }

        // Reflect the band blocks where the multiplier sign flipped.
        for i in 0..n {
            if lambda[i] < 0.0 {
                gradient[n + i] = -gradient[n + i];
            }
            if upsilon[i] < 0.0 {
                gradient[2 * n + i] = -gradient[2 * n + i];
            }
        }

        Evaluation { bound, gradient, selected, weights, reduced }
    }
}
