use chrono::NaiveDate;
use former_solver::engine::Board;
use former_solver::random::board_from_date;
use former_solver::snapshot::read_snapshot;
use former_solver::solver::{replay, solve, solve_astar, SearchOutcome, Solution, SolverConfig};
use std::path::PathBuf;

/// Fewest clicks that clear `four_rows.json`, found by exhaustive search.
const FOUR_ROWS_MINIMUM: usize = 9;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn four_rows_board() -> Board {
    read_snapshot(fixture("four_rows.json")).unwrap()
}

fn expect_solved(outcome: SearchOutcome) -> Solution {
    match outcome {
        SearchOutcome::Solved(solution) => solution,
        other => panic!("expected a solution, got {:?}", other),
    }
}

#[test]
fn snapshot_fixture_loads() {
    let board = four_rows_board();
    assert_eq!(board.brick_count(), 28);
    assert_eq!(board.click_groups().len(), 10);
    assert_eq!(
        board.to_plain_string(),
        [
            ".......", ".......", ".......", ".......", ".......", "OGGPBBO", "OOGPPBO",
            "BBGGPOO", "PBBOGGP",
        ]
        .join("\n")
    );
}

#[test]
fn sequential_search_solves_snapshot() {
    let board = four_rows_board();
    let config = SolverConfig::new(4.0).with_max_expansions(10_000);

    let solution = expect_solved(solve_astar(&board, &config).unwrap());
    assert_eq!(solution.len(), FOUR_ROWS_MINIMUM);
    assert!(solution.expansions <= 1_000, "{} expansions", solution.expansions);
    assert!(replay(&board, &solution.moves).unwrap().is_empty());
}

#[test]
fn sequential_search_is_deterministic() {
    let board = four_rows_board();
    let config = SolverConfig::new(4.0);

    let first = expect_solved(solve_astar(&board, &config).unwrap());
    let second = expect_solved(solve_astar(&board, &config).unwrap());
    assert_eq!(first, second);
}

#[test]
fn concurrent_search_solves_snapshot() {
    let board = four_rows_board();
    let config = SolverConfig::new(4.0)
        .with_workers(4)
        .with_max_expansions(200_000);

    for _ in 0..5 {
        let solution = expect_solved(solve(&board, &config).unwrap());
        assert!(solution.len() >= FOUR_ROWS_MINIMUM);
        assert!(replay(&board, &solution.moves).unwrap().is_empty());
    }
}

#[test]
fn sequential_and_concurrent_both_clear_daily_board() {
    let board = board_from_date(NaiveDate::from_ymd_opt(2024, 11, 27).unwrap()).unwrap();
    assert_eq!(board.brick_count(), 63);

    for workers in [1, 3] {
        let config = SolverConfig::new(6.0)
            .with_workers(workers)
            .with_max_expansions(500_000);
        let solution = expect_solved(solve(&board, &config).unwrap());
        assert!(!solution.is_empty());
        assert!(replay(&board, &solution.moves).unwrap().is_empty());
    }
}

#[test]
fn sequential_search_on_daily_board_stays_small() {
    let board = board_from_date(NaiveDate::from_ymd_opt(2024, 11, 27).unwrap()).unwrap();
    let solution = expect_solved(solve_astar(&board, &SolverConfig::new(6.0)).unwrap());
    assert!(solution.len() <= 20, "{} clicks", solution.len());
    assert!(solution.expansions <= 1_000, "{} expansions", solution.expansions);
}
