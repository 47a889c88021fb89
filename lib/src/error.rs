use thiserror::Error;

use crate::Location;

/// Ways a puzzle definition can fail validation before any search begins.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The grid is not square: some row's length differs from the row count.
    #[error("board is not square: row {row} has {len} cells, expected {expected}")]
    NotSquare { row: usize, len: usize, expected: usize },
    /// An endpoint character must appear exactly twice across the grid.
    #[error("endpoint '{display}' appears {count} times, expected exactly 2")]
    UnpairedEndpoint { display: char, count: usize },
    /// A terminus was placed outside the board bounds.
    #[error("terminus at ({}, {}) is out of bounds for a {size}x{size} board", .location.0, .location.1)]
    OutOfBounds { location: Location, size: usize },
}

/// Ways a solve can end without a goal board.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// Every agent exhausted its open heap and inbox with no goal announced.
    #[error("puzzle is unsolvable")]
    Unsolvable,
    /// Shutdown was requested before a goal was found.
    #[error("search interrupted before a solution was found")]
    Interrupted,
}
