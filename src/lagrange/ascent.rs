//! Subgradient ascent on the dual.
//!
//! Polyak steps toward the incumbent: t = θ·(UB − f)/‖g‖², with θ
//! halved after a stretch of non-improving rounds. Each round that
//! lifts the best bound also runs the safe-fixing deduction, so the
//! fixing tables tighten as the gap closes.

use crate::hess::FixingTables;
use crate::lagrange::{Relaxation, deduce_fixings};

/// What an ascent run achieved.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AscentReport {
    /// Best lower bound proven.
    pub bound: f64,
    /// Rounds actually evaluated.
    pub rounds: usize,
}

const STALL_LIMIT: usize = 20;
const THETA_FLOOR: f64 = 1e-4;
const GAP_EPS: f64 = 1e-9;

/// Run at most `max_rounds` ascent rounds against the incumbent `ub`
/// (which must be finite), tightening `fix` as bounds allow. Stops
/// early when the step collapses, the gradient vanishes, the gap
/// closes, or the fixings stop admitting k centers.
pub(crate) fn ascend(
    relax: &Relaxation<'_>,
    fix: &mut FixingTables,
    clusters: &[Vec<usize>],
    ub: f64,
    max_rounds: usize,
    verbose: u8,
) -> AscentReport {
    assert!(ub.is_finite(), "ascent needs a finite incumbent");
    let n = relax.n();

    let mut mu = vec![0.0; 3 * n];
    let mut best = f64::NEG_INFINITY;
    let mut theta = 2.0;
    let mut stall = 0usize;
    let mut rounds = 0usize;

    for round in 0..max_rounds {
        rounds = round + 1;
        let eval = relax.evaluate(&mu, fix);

        if eval.bound > best + GAP_EPS {
            best = eval.bound;
            stall = 0;
            deduce_fixings(fix, &eval, clusters, ub);
            if verbose > 1 {
                let stats = fix.stats();
                println!(
                    "ascent round {round}: bound = {best:.8}, fixed {} zeros / {} ones, {} centers left",
                    stats.zeros, stats.ones, stats.centers_left
                );
            }
            if !fix.admits_centers(relax.k) {
                // Nothing below the incumbent completes to k centers.
                break;
            }
        } else {
            stall += 1;
            if stall >= STALL_LIMIT {
                theta /= 2.0;
                stall = 0;
            }
        }

        if theta < THETA_FLOOR || best >= ub - GAP_EPS {
            break;
        }

        let norm2: f64 = eval.gradient.iter().map(|g| g * g).sum();
        if norm2 <= 1e-12 {
            break;
        }

        let step = theta * (ub - eval.bound) / norm2;
        for (m, g) in mu.iter_mut().zip(&eval.gradient) {
            *m += step * g;
        }
    }

    if verbose > 0 {
        println!("ascent: best bound = {best:.8} after {rounds} rounds");
    }
    AscentReport { bound: best, rounds }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hess::cost_matrix;
    use crate::lagrange::Relaxation;
    use ndarray::Array2;

    fn line_instance(population: Vec<i64>) -> (Vec<i64>, Array2<f64>) {
        let n = population.len();
        let mut dist = Array2::<i64>::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                dist[[i, j]] = 1000 * (i as i64 - j as i64).abs();
            }
        }
        let w = cost_matrix(&population, &dist);
        (population, w)
    }

    /// Brute-force the best feasible Hess objective (no contiguity) for
    /// tiny instances.
    fn brute_force_optimum(
        w: &Array2<f64>,
        population: &[i64],
        lower: i64,
        upper: i64,
        k: usize,
    ) -> f64 {
        let n = population.len();
        let mut best = f64::INFINITY;
        // every assignment of units to one of k labeled slots, with
        // every slot center chosen as its cheapest member
        let mut stack = vec![0usize; n];
        'outer: loop {
            // evaluate
            let mut cost_total = 0.0;
            let mut ok = true;
            for slot in 0..k {
                let members: Vec<usize> = (0..n).filter(|&i| stack[i] == slot).collect();
                let pop: i64 = members.iter().map(|&i| population[i]).sum();
                if members.is_empty() || pop < lower || pop > upper {
                    ok = false;
                    break;
                }
                let cost = members.iter()
                    .map(|&c| members.iter().map(|&v| w[[v, c]]).sum::<f64>())
                    .fold(f64::INFINITY, f64::min);
                cost_total += cost;
            }
            if ok && cost_total < best {
                best = cost_total;
            }
            // next assignment
            for i in 0..n {
                stack[i] += 1;
                if stack[i] < k {
                    continue 'outer;
                }
                stack[i] = 0;
            }
            break;
        }
        best
    }

    #[test]
    fn bound_converges_below_the_optimum() {
        let (population, w) = line_instance(vec![10, 10, 10, 10]);
        let optimum = brute_force_optimum(&w, &population, 20, 20, 2);

        let relax = Relaxation { w: &w, population: &population, lower: 20, upper: 20, k: 2 };
        let mut fix = FixingTables::new(4);

        let clusters: Vec<Vec<usize>> = (0..4).map(|j| vec![j]).collect();
        let report = ascend(&relax, &mut fix, &clusters, optimum, 300, 0);

        assert!(report.bound <= optimum + 1e-9);
        assert!(report.bound > f64::NEG_INFINITY);
        assert!(report.rounds >= 1);
    }

    #[test]
    fn fixings_stay_sound_under_ascent() {
        // Star: hub 0 with four light leaves. The only balanced
        // 2-split without the hub is impossible, so leaf-centered
        // columns should price out; whatever gets fixed must not cut
        // off any optimal assignment.
        let population = vec![30i64, 5, 5, 5, 5];
        let n = population.len();
        let mut dist = Array2::<i64>::zeros((n, n));
        for leaf in 1..n {
            dist[[0, leaf]] = 1000;
            dist[[leaf, 0]] = 1000;
            for other in 1..n {
                if other != leaf {
                    dist[[leaf, other]] = 2000;
                }
            }
        }
        let w = cost_matrix(&population, &dist);

        let (lower, upper, k) = (10, 40, 2);
        let optimum = brute_force_optimum(&w, &population, lower, upper, k);
        assert!(optimum.is_finite());

        // Singleton clusters keep the forcing rule on the diagonals,
        // where it is independent of any particular optimal plan.
        let clusters: Vec<Vec<usize>> = (0..n).map(|j| vec![j]).collect();
        let relax = Relaxation { w: &w, population: &population, lower, upper, k };
        let mut fix = FixingTables::new(n);
        ascend(&relax, &mut fix, &clusters, optimum, 500, 0);

        // Re-enumerate: every optimal assignment must respect the
        // tables.
        let mut stack = vec![0usize; n];
        'outer: loop {
            let mut cost_total = 0.0;
            let mut ok = true;
            let mut centers = vec![usize::MAX; k];
            for slot in 0..k {
                let members: Vec<usize> = (0..n).filter(|&i| stack[i] == slot).collect();
                let pop: i64 = members.iter().map(|&i| population[i]).sum();
                if members.is_empty() || pop < lower || pop > upper {
                    ok = false;
                    break;
                }
                let (cost, center) = members.iter()
                    .map(|&c| (members.iter().map(|&v| w[[v, c]]).sum::<f64>(), c))
                    .fold((f64::INFINITY, usize::MAX), |acc, cur| if cur.0 < acc.0 { cur } else { acc });
                cost_total += cost;
                centers[slot] = center;
            }
            if ok && cost_total <= optimum + 1e-9 {
                // An optimal assignment: exclusions must not cut it
                // off, and every diagonal one must be among its
                // centers. (Off-diagonal ones mirror the caller's
                // clustering and are checked at the unit level in the
                // fixing tests.)
                for slot in 0..k {
                    let j = centers[slot];
                    for i in (0..n).filter(|&i| stack[i] == slot) {
                        assert!(!fix.is_zero(i, j),
                            "sound fixing violated: optimal plan assigns {i} to {j}");
                    }
                }
                for j in 0..n {
                    if fix.is_one(j, j) {
                        assert!(centers.contains(&j),
                            "sound fixing violated: {j} forced open but not a center");
                    }
                }
            }
            for i in 0..n {
                stack[i] += 1;
                if stack[i] < k {
                    continue 'outer;
                }
                stack[i] = 0;
            }
            break;
        }
    }
}
