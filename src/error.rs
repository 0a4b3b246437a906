//! Error types for the Former solver.
//!
//! Structural failures (bad positions, malformed snapshots, invalid solver
//! settings) are returned to the immediate caller. An exhausted search is not
//! an error; see [`crate::solver::SearchOutcome`].

use thiserror::Error;

/// Errors that can occur while building boards or configuring a search.
#[derive(Error, Debug)]
pub enum FormerError {
    /// Linear cell index outside the 7x9 grid
    #[error("Position {pos} is out of range (must be 0-62)")]
    PositionOutOfRange { pos: usize },

    /// Coordinates outside the 7x9 grid
    #[error("Coordinates (x:{x}, y:{y}) are out of range (board is 7x9)")]
    CoordinatesOutOfRange { x: usize, y: usize },

    /// Snapshot cell names a gem the game does not have
    #[error("Unknown gem color '{name}' at (x:{x}, y:{y})")]
    UnknownGemColor { name: String, x: usize, y: usize },

    /// Snapshot or text grid with the wrong number of rows or columns
    #[error("Invalid board shape: {message}")]
    InvalidShape { message: String },

    /// Text grid contains a character that is not a brick or '.'
    #[error("Unrecognized character '{ch}' at (x:{x}, y:{y})")]
    InvalidCharacter { ch: char, x: usize, y: usize },

    /// Solver settings that cannot drive a search
    #[error("Invalid solver configuration: {message}")]
    InvalidConfig { message: String },

    /// Date arithmetic left the supported calendar range
    #[error("Invalid date: {message}")]
    InvalidDate { message: String },

    #[error("Malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for solver operations
pub type FormerResult<T> = Result<T, FormerError>;
