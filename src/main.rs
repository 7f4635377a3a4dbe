use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use config_file::FromConfigFile;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use gridmdp::grid::{Grid, DEFAULT_MAX_SWEEPS, DISCOUNT};
use gridmdp::policy::Policy;
use gridmdp::worlds;


/// Command line argument parser.
#[derive(Parser, Debug)]
#[command(about = "Solve grid world MDPs with policy and value iteration", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    command: Commands
}


#[derive(Subcommand, Debug)]
enum Commands {
    /// Solve the grid in a TOML configuration file and print both policies.
    Solve { config_path: PathBuf },
    /// Solve the built-in 6x6 maze.
    Classic,
    /// Write the utility traces of both algorithms to a CSV file.
    Trace { config_path: PathBuf, output: PathBuf },
    /// Compare both algorithms on random mazes for a range of precisions.
    Survey {
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Hold information read from TOML configuration file.
///
/// Walls are written as `nan` in `rewards`.
#[derive(Deserialize, Debug)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    pub rewards: Vec<f64>,
    pub policy_epsilon: f64,
    pub value_epsilon: f64,
    #[serde(default = "default_discount")]
    pub discount: f64,
    #[serde(default = "default_max_sweeps")]
    pub max_sweeps: usize,
}

fn default_discount() -> f64 {
    DISCOUNT
}

fn default_max_sweeps() -> usize {
    DEFAULT_MAX_SWEEPS
}


fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Solve { config_path } => {
            let config = read_config(&config_path)?;
            let mut grid = grid_from_config(&config)?;
            solve(&mut grid, config.policy_epsilon, config.value_epsilon)?;
        }
        Commands::Classic => {
            let mut grid = Grid::square(6, &worlds::classic_rewards())?;
            solve(&mut grid, 0.1, 0.2)?;
        }
        Commands::Trace { config_path, output } => {
            let config = read_config(&config_path)?;
            let mut grid = grid_from_config(&config)?;
            grid.policy_iteration(config.policy_epsilon)?;
            grid.value_iteration(config.value_epsilon)?;
            let mut wtr = csv::Writer::from_path(&output)?;
            grid.policy_iteration_trace().write_csv("policy", &mut wtr)?;
            grid.value_iteration_trace().write_csv("value", &mut wtr)?;
            wtr.flush()?;
            log::info!("Wrote utility traces to {}", output.display());
        }
        Commands::Survey { seed } => {
            let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
            log::info!("seed: {seed}");
            let mut rng = StdRng::seed_from_u64(seed);
            let reports =
                worlds::survey(&mut rng, &worlds::EPSILON_PAIRS, &worlds::SURVEY_SIZES)?;
            for report in reports {
                println!("Precision Values: ({}, {}) Solved = {} Unsolved = {}",
                         report.policy_epsilon, report.value_epsilon,
                         report.solved.len(), report.unsolved.len());
                if !report.solved.is_empty() {
                    println!("Solved MDPs");
                }
                for m in &report.solved {
                    println!("({}x{}) = {} Policy Iteration = {} Value Iteration = {}",
                             m.rows, m.cols, m.rows * m.cols, m.policy_sweeps, m.value_sweeps);
                }
                if !report.unsolved.is_empty() {
                    println!("\nUnsolved MDPs");
                }
                for (rows, cols) in &report.unsolved {
                    print!("({}x{}) = {} ", rows, cols, rows * cols);
                }
                println!("\n");
            }
        }
    }
    Ok(())
}


fn read_config(config_path: &Path) -> Result<GridConfig, Box<dyn Error>> {
    log::info!("Reading config file: {}", config_path.display());
    Ok(GridConfig::from_config_file(config_path)?)
}

fn grid_from_config(config: &GridConfig) -> Result<Grid, Box<dyn Error>> {
    let grid = Grid::new(config.rows, config.cols, &config.rewards)?
        .with_discount(config.discount)?
        .with_max_sweeps(config.max_sweeps);
    Ok(grid)
}

fn solve(grid: &mut Grid, policy_epsilon: f64, value_epsilon: f64) -> Result<(), Box<dyn Error>> {
    println!("{}x{} grid, discount {}", grid.rows(), grid.cols(), grid.discount());
    let policy_sweeps = grid.policy_iteration(policy_epsilon)?;
    println!("\n=== Policy Iteration ({} evaluation sweeps) ===", policy_sweeps);
    show_policy(grid, grid.policy_iteration_policy());
    show_utilities(grid);

    let value_sweeps = grid.value_iteration(value_epsilon)?;
    println!("\n=== Value Iteration ({} sweeps) ===", value_sweeps);
    show_policy(grid, grid.value_iteration_policy());
    show_utilities(grid);

    if grid.policies_agree() {
        println!("\nBoth algorithms found the same policy.");
    } else {
        println!("\nPolicies differ at: {:?}", grid.policy_mismatches(1e-9));
    }
    Ok(())
}

fn show_policy(grid: &Grid, policy: &Policy) {
    for state in grid.states() {
        let symbol = match policy.get(&state.coord()) {
            Some(d) => d.arrow(),
            None => '#',
        };
        print!("{:>3}", symbol);
        if state.col() + 1 == grid.cols() {
            println!();
        }
    }
}

fn show_utilities(grid: &Grid) {
    for state in grid.states() {
        match grid.utility(state.coord()) {
            Some(u) => print!("{:9.3} ", u),
            None => print!("{:>9} ", "wall"),
        }
        if state.col() + 1 == grid.cols() {
            println!();
        }
    }
}
