use anyhow::Result;
use clap::Parser;
use former_solver::engine::Board;
use former_solver::solver::{replay, solve, SearchOutcome, SolverConfig};
use log::warn;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compares heuristic tuning factors on seeded random boards", long_about = None)]
struct Args {
    /// Number of random boards per tuning factor
    #[clap(short, long, default_value_t = 20)]
    boards: u64,

    /// Seed of the first board; later boards use consecutive seeds
    #[clap(long, default_value_t = 0)]
    start_seed: u64,

    /// Tuning factors to compare
    #[clap(short, long, value_delimiter = ',', default_value = "1.5,2.0,2.3,3.0,4.0")]
    tunings: Vec<f64>,

    /// Expansion cap per board
    #[clap(long, default_value_t = 200_000)]
    max_expansions: usize,

    /// Concurrent expansions per solve
    #[clap(short, long, default_value_t = 1)]
    workers: usize,
}

#[derive(Default)]
struct TuningStats {
    solved: usize,
    total_length: usize,
    total_expansions: usize,
}

impl TuningStats {
    fn average_length(&self) -> f64 {
        if self.solved == 0 {
            f64::INFINITY
        } else {
            self.total_length as f64 / self.solved as f64
        }
    }

    fn average_expansions(&self) -> f64 {
        if self.solved == 0 {
            f64::INFINITY
        } else {
            self.total_expansions as f64 / self.solved as f64
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let boards: Vec<(u64, Board)> = (0..args.boards)
        .map(|i| {
            let seed = args.start_seed + i;
            (seed, Board::random(&mut SmallRng::seed_from_u64(seed)))
        })
        .collect();

    println!(
        "Starting tuning evaluation for {} boards, {} tuning factors...",
        boards.len(),
        args.tunings.len()
    );

    let mut results: Vec<(f64, TuningStats)> = Vec::new();
    for &tuning in &args.tunings {
        let config = SolverConfig::new(tuning)
            .with_workers(args.workers)
            .with_max_expansions(args.max_expansions);
        let mut stats = TuningStats::default();

        for (seed, board) in &boards {
            match solve(board, &config)? {
                SearchOutcome::Solved(solution) => {
                    if !replay(board, &solution.moves)?.is_empty() {
                        warn!("Tuning {} produced an invalid solution for seed {}", tuning, seed);
                        continue;
                    }
                    println!(
                        "  Tuning: {:<5}, Seed: {:<4}, Length: {:<3}, Expansions: {}",
                        tuning,
                        seed,
                        solution.len(),
                        solution.expansions
                    );
                    stats.solved += 1;
                    stats.total_length += solution.len();
                    stats.total_expansions += solution.expansions;
                }
                outcome => {
                    println!(
                        "  Tuning: {:<5}, Seed: {:<4}, unsolved after {} expansions",
                        tuning,
                        seed,
                        outcome.expansions()
                    );
                }
            }
        }
        results.push((tuning, stats));
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of boards evaluated: {}", boards.len());
    println!("\n--- Average Solution Lengths ---");

    // Shortest solutions first, fewer expansions breaking ties
    results.sort_by(|a, b| {
        a.1.average_length()
            .total_cmp(&b.1.average_length())
            .then(a.1.average_expansions().total_cmp(&b.1.average_expansions()))
    });

    for (tuning, stats) in &results {
        println!(
            "Tuning {:<5}: Solved {}/{}, Average Length = {:.2}, Average Expansions = {:.0}",
            tuning,
            stats.solved,
            boards.len(),
            stats.average_length(),
            stats.average_expansions()
        );
    }
    Ok(())
}
