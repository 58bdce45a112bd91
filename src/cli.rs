use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueHint};

use crate::contiguity::Contiguity;
use crate::io::{read_dimacs, read_distance_matrix, read_population};
use crate::mip::GoodLpSolver;
use crate::solve::{Instance, SolveOptions, SolveOutcome, solve};

/// Optimal districting over a contact graph.
#[derive(Parser, Debug)]
#[command(name = "districtor", version, about)]
pub struct Cli {
    /// DIMACS contact graph
    #[arg(value_hint = ValueHint::FilePath)]
    pub graph: PathBuf,

    /// CSV distance matrix (integer milli-units)
    #[arg(value_hint = ValueHint::FilePath)]
    pub distance: PathBuf,

    /// Node population file
    #[arg(value_hint = ValueHint::FilePath)]
    pub population: PathBuf,

    /// Minimum district population
    pub lower: i64,

    /// Maximum district population
    pub upper: i64,

    /// Number of districts
    pub districts: usize,

    /// Contiguity model: shir, mcf, cut or lcut
    #[arg(long, default_value = "shir")]
    pub model: Contiguity,

    /// Random restarts of the descent heuristic
    #[arg(long, default_value_t = 10)]
    pub max_iterations: usize,

    /// Subgradient ascent rounds
    #[arg(long, default_value_t = 300)]
    pub ascent_rounds: usize,

    /// RNG seed (0 uses the built-in default stream)
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Also separate component cuts inside the descent
    #[arg(long)]
    pub descent_cuts: bool,

    /// Output file
    #[arg(short, long, default_value = "districting.out", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    println!(
        "Model input: L = {}, U = {}, k = {}",
        cli.lower, cli.upper, cli.districts
    );

    let graph = read_dimacs(&cli.graph)?;
    let distance = read_distance_matrix(&cli.distance, graph.node_count())?;
    let population = read_population(&cli.population, graph.node_count())?;

    let instance = Instance::new(
        graph,
        population,
        distance,
        cli.lower,
        cli.upper,
        cli.districts,
    )?;

    let options = SolveOptions {
        contiguity: cli.model,
        restarts: cli.max_iterations,
        descent_cuts: cli.descent_cuts,
        ascent_rounds: cli.ascent_rounds,
        seed: cli.seed,
        verbose: cli.verbose,
    };

    match solve(&instance, &options, &GoodLpSolver)? {
        SolveOutcome::Solved(plan) => {
            println!("objective = {:.8}, proven bound = {:.8}", plan.objective, plan.bound);
            plan.write(&cli.output)?;
            if cli.verbose > 0 {
                println!("wrote {} lines to {}", plan.assignment.len(), cli.output.display());
            }
        }
        SolveOutcome::Infeasible => {
            println!("Problem is infeasible");
        }
    }
    Ok(())
}
