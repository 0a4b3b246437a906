//! # Former Solver Library
//!
//! Finds short click sequences that clear a board of NRK's Former puzzle: a
//! 7x9 grid of four brick colours where clicking a connected group removes it
//! and the bricks above fall into the gap.
//!
//! It is used by two binaries:
//! - `solve`: loads a board from a JSON snapshot, a date or a seed string and
//!   prints a click sequence that empties it.
//! - `tuning_evaluator`: compares heuristic tuning factors over seeded random
//!   boards.
//!
//! ## Modules
//! - `engine`: the bit-packed `Board`, click groups (connectivity) and gravity.
//! - `heuristics`: the cost-to-go estimate and the per-solve click-group cache.
//! - `solver`: search states, the priority frontier, `SolverConfig` and the
//!   sequential best-first search.
//! - `parallel`: the concurrent variant of the same search.
//! - `snapshot`: boards from the game's JSON export.
//! - `random`: the game's seeded generator, for boards by date or seed.
//! - `utils`: parsing boards from text grids.
//! - `error`: `FormerError` and the `FormerResult` alias.

pub mod engine;
pub mod error;
pub mod heuristics;
pub mod parallel;
pub mod random;
pub mod snapshot;
pub mod solver;
pub mod utils;
