use ndarray::Array2;

/// Build the moment-of-inertia cost matrix for the Hess objective:
/// `w[i][j] = population[i] * (dist[i][j] / 1000)^2`.
///
/// Distances are integer milli-units; the division rescales them before
/// squaring. The result is only as symmetric as `dist` is, and no
/// symmetry is assumed anywhere downstream.
pub fn cost_matrix(population: &[i64], dist: &Array2<i64>) -> Array2<f64> {
    let n = population.len();
    assert!(dist.dim() == (n, n), "dist must be {n}x{n} to match population");

    let mut w = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            let scaled = dist[[i, j]] as f64 / 1000.0;
            w[[i, j]] = scaled * scaled * population[i] as f64;
        }
    }
    w
}
