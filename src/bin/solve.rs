use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgGroup, Parser};
use former_solver::engine::Board;
use former_solver::random::{board_from_date, board_from_seed};
use former_solver::snapshot::read_snapshot;
use former_solver::solver::{replay, solve, SearchOutcome, SolverConfig, DEFAULT_TUNING};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Finds a short click sequence that clears a Former board", long_about = None)]
#[clap(group(ArgGroup::new("source").args(["snapshot", "date", "seed"])))]
struct Args {
    /// JSON snapshot exported from the game
    #[clap(long)]
    snapshot: Option<PathBuf>,

    /// Daily board for this date (YYYY-MM-DD); defaults to today
    #[clap(long)]
    date: Option<NaiveDate>,

    /// Board generated from an arbitrary seed string
    #[clap(long)]
    seed: Option<String>,

    /// Heuristic multiplier; higher is greedier
    #[clap(short, long, default_value_t = DEFAULT_TUNING)]
    tuning: f64,

    /// Concurrent expansions (1 runs the sequential search)
    #[clap(short, long, default_value_t = num_cpus::get())]
    workers: usize,

    /// Give up after this many expansions
    #[clap(long)]
    max_expansions: Option<usize>,

    /// Print the board before every click
    #[clap(long)]
    show_steps: bool,
}

fn load_board(args: &Args) -> Result<Board> {
    if let Some(path) = &args.snapshot {
        return read_snapshot(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()));
    }
    if let Some(seed) = &args.seed {
        return Ok(board_from_seed(seed));
    }
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    info!("Generating board for {}", date);
    board_from_date(date).with_context(|| format!("Failed to generate board for {}", date))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let board = load_board(&args)?;
    println!("Initial board state:\n{}\n", board);

    let mut config = SolverConfig::new(args.tuning).with_workers(args.workers);
    if let Some(limit) = args.max_expansions {
        config = config.with_max_expansions(limit);
    }

    let solution = match solve(&board, &config)? {
        SearchOutcome::Solved(solution) => solution,
        SearchOutcome::Exhausted { expansions } => {
            bail!("No solution found after {} expansions", expansions)
        }
        SearchOutcome::ExpansionLimit { expansions } => {
            bail!("No solution found within {} expansions", expansions)
        }
    };

    if !replay(&board, &solution.moves)?.is_empty() {
        bail!("Solution does not clear the board");
    }

    if args.show_steps {
        let mut current = board;
        for (i, click) in solution.moves.iter().enumerate() {
            println!(
                "Step {}: click {}\n{}\n",
                i + 1,
                click,
                current.to_string_with_highlight(Some(click.pos()))
            );
            current.click(click.pos())?;
        }
    }

    println!("Solution sequence, len {}:", solution.len());
    for (i, click) in solution.moves.iter().enumerate() {
        println!("{}. {}", i + 1, click);
    }
    Ok(())
}
