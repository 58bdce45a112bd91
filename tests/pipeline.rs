//! End-to-end scenarios driven through the public API.

use districtor::{
    Contiguity, Graph, GoodLpSolver, Instance, MipModel, MipSolver, SolveOptions, SolveOutcome,
    plan_cost, solve,
};
use ndarray::Array2;

fn line_graph(n: usize) -> Graph {
    Graph::from_edge_list(
        n,
        &(0..n - 1).map(|i| (i as u32, i as u32 + 1)).collect::<Vec<_>>(),
    )
}

/// Distances |i - j| in milli-units, as in the reference scenarios.
fn unit_line_distances(n: usize) -> Array2<i64> {
    let mut dist = Array2::<i64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            dist[[i, j]] = (i as i64 - j as i64).abs();
        }
    }
    dist
}

fn options(seed: u64) -> SolveOptions {
    SolveOptions { seed, restarts: 5, ..SolveOptions::default() }
}

#[test]
fn three_singleton_districts_cost_nothing() {
    let instance = Instance::new(
        line_graph(3),
        vec![10, 10, 10],
        unit_line_distances(3),
        10,
        10,
        3,
    )
    .unwrap();

    match solve(&instance, &options(1), &GoodLpSolver).unwrap() {
        SolveOutcome::Solved(plan) => {
            assert_eq!(plan.assignment, vec![0, 1, 2]);
            assert!(plan.objective.abs() < 1e-12);
            assert!(plan.bound.abs() < 1e-12);
        }
        SolveOutcome::Infeasible => panic!("instance is feasible"),
    }
}

#[test]
fn balanced_halves_of_a_path_of_four() {
    let instance = Instance::new(
        line_graph(4),
        vec![10, 10, 10, 10],
        unit_line_distances(4),
        20,
        20,
        2,
    )
    .unwrap();

    match solve(&instance, &options(7), &GoodLpSolver).unwrap() {
        SolveOutcome::Solved(plan) => {
            // Optimal split keeps the halves together; the center of
            // each half may be either of its two units.
            let labels = plan.labels();
            assert_eq!(labels[0], labels[1]);
            assert_eq!(labels[2], labels[3]);
            assert_ne!(labels[0], labels[2]);

            let reference = plan_cost(&instance, &[0, 0, 3, 3]);
            assert!((plan.objective - reference).abs() < 1e-12,
                "objective {} differs from the balanced split {}", plan.objective, reference);
            assert!(plan.bound <= plan.objective + 1e-12);
        }
        SolveOutcome::Infeasible => panic!("instance is feasible"),
    }
}

#[test]
fn single_district_picks_the_median() {
    let instance = Instance::new(
        line_graph(3),
        vec![10, 10, 10],
        unit_line_distances(3),
        30,
        30,
        1,
    )
    .unwrap();

    match solve(&instance, &options(3), &GoodLpSolver).unwrap() {
        SolveOutcome::Solved(plan) => {
            assert_eq!(plan.assignment, vec![1, 1, 1]);
            let reference = plan_cost(&instance, &[1, 1, 1]);
            assert!((plan.objective - reference).abs() < 1e-12);
        }
        SolveOutcome::Infeasible => panic!("instance is feasible"),
    }
}

#[test]
fn oversized_unit_makes_singleton_districts_infeasible() {
    let instance = Instance::new(
        line_graph(3),
        vec![10, 11, 10],
        unit_line_distances(3),
        10,
        10,
        3,
    )
    .unwrap();

    match solve(&instance, &options(5), &GoodLpSolver).unwrap() {
        SolveOutcome::Solved(plan) => panic!("expected infeasibility, got {:?}", plan.assignment),
        SolveOutcome::Infeasible => {}
    }
}

/// Oracle that refuses to build any model.
struct NoSolver;

impl MipSolver for NoSolver {
    fn new_model(&self) -> Box<dyn MipModel> {
        panic!("a disconnected instance must be rejected before any model is built");
    }
}

#[test]
fn disconnected_graph_is_rejected_before_any_model() {
    let instance = Instance::new(
        Graph::from_edge_list(4, &[(0, 1), (2, 3)]),
        vec![10, 10, 10, 10],
        unit_line_distances(4),
        20,
        20,
        2,
    )
    .unwrap();

    match solve(&instance, &options(1), &NoSolver).unwrap() {
        SolveOutcome::Infeasible => {}
        SolveOutcome::Solved(_) => panic!("disconnected instance cannot be solved"),
    }
}

#[test]
fn every_contiguity_model_agrees_on_the_optimum() {
    let mut reference: Option<f64> = None;
    for contiguity in [Contiguity::Shir, Contiguity::Mcf, Contiguity::Cut, Contiguity::Lcut] {
        let instance = Instance::new(
            line_graph(5),
            vec![10, 10, 10, 10, 20],
            unit_line_distances(5),
            20,
            40,
            2,
        )
        .unwrap();

        let opts = SolveOptions { contiguity, ..options(11) };
        match solve(&instance, &opts, &GoodLpSolver).unwrap() {
            SolveOutcome::Solved(plan) => {
                let objective = plan.objective;
                if let Some(expected) = reference {
                    assert!((objective - expected).abs() < 1e-9,
                        "{contiguity} found {objective}, others found {expected}");
                } else {
                    reference = Some(objective);
                }
                // On a path, contiguous districts are intervals: the
                // label sequence changes exactly k - 1 times.
                let labels = plan.labels();
                let changes = labels.windows(2).filter(|pair| pair[0] != pair[1]).count();
                assert_eq!(changes, 1, "{contiguity} produced non-interval districts {labels:?}");
            }
            SolveOutcome::Infeasible => panic!("instance is feasible"),
        }
    }
}

#[test]
fn plan_file_has_one_line_per_unit() {
    let instance = Instance::new(
        line_graph(4),
        vec![10, 10, 10, 10],
        unit_line_distances(4),
        20,
        20,
        2,
    )
    .unwrap();

    let SolveOutcome::Solved(plan) = solve(&instance, &options(2), &GoodLpSolver).unwrap() else {
        panic!("instance is feasible");
    };

    let mut path = std::env::temp_dir();
    path.push(format!("districtor-pipeline-{}.out", std::process::id()));
    plan.write(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    for (i, line) in lines.iter().enumerate() {
        let mut fields = line.split_whitespace();
        assert_eq!(fields.next().unwrap().parse::<usize>().unwrap(), i);
        let district: usize = fields.next().unwrap().parse().unwrap();
        assert!(district >= 1 && district <= 2);
    }
}
