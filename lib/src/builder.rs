use ndarray::Array2;
use unordered_pair::UnorderedPair;

use crate::cell::Cell;
use crate::error::BoardError;
use crate::location::Location;
use crate::state::State;

/// Builds the initial [`State`] of a puzzle, either programmatically via
/// [`add_termini`](Self::add_termini) or from a textual grid via
/// [`from_rows`](Self::from_rows).
///
/// Color ids are assigned in the order termini pairs are added (for grids:
/// first-appearance order). Invalid input accumulates in the builder and
/// surfaces when [`build`](Self::build) is called.
#[derive(Clone)]
pub struct BoardBuilder {
    size: usize,
    termini: Vec<(char, UnorderedPair<Location>)>,
    errors: Vec<BoardError>,
}

impl BoardBuilder {
    pub fn with_size(size: usize) -> Self {
        Self { size, termini: Vec::new(), errors: Vec::new() }
    }

    /// Add the two endpoints of the next color. The pair is unordered; which
    /// endpoint acts as the search source is decided by the edge-distance
    /// rule when the state is assembled.
    pub fn add_termini(&mut self, display: char, locations: UnorderedPair<Location>) -> &mut Self {
        for location in [locations.0, locations.1] {
            if location.0 >= self.size || location.1 >= self.size {
                self.errors.push(BoardError::OutOfBounds { location, size: self.size });
                return self;
            }
        }

        self.termini.push((display, locations));
        self
    }

    /// Parse a textual grid: `.` for free squares, any other character marks
    /// an endpoint and must appear exactly twice.
    pub fn from_rows(rows: &[impl AsRef<str>]) -> Self {
        let size = rows.len();
        let mut builder = Self::with_size(size);
        // (display, occurrences) in first-appearance order.
        let mut seen: Vec<(char, Vec<Location>)> = Vec::new();

        for (row, content) in rows.iter().enumerate() {
            let cells: Vec<char> = content.as_ref().chars().collect();
            if cells.len() != size {
                builder.errors.push(BoardError::NotSquare { row, len: cells.len(), expected: size });
                continue;
            }

            for (col, ch) in cells.into_iter().enumerate() {
                if ch == '.' {
                    continue;
                }
                let at = Location(row, col);
                match seen.iter_mut().find(|(display, _)| *display == ch) {
                    Some((_, occurrences)) => occurrences.push(at),
                    None => seen.push((ch, vec![at])),
                }
            }
        }

        for (display, occurrences) in seen {
            if occurrences.len() != 2 {
                builder.errors.push(BoardError::UnpairedEndpoint { display, count: occurrences.len() });
                continue;
            }
            builder.add_termini(display, UnorderedPair(occurrences[0], occurrences[1]));
        }

        builder
    }

    /// Check the validity of everything added so far.
    pub fn is_valid(&self) -> Option<&[BoardError]> {
        match self.errors.is_empty() {
            true => None,
            false => Some(&self.errors),
        }
    }

    /// Assemble the initial state, applying the endpoint swap rule.
    pub fn build(&self) -> Result<State, BoardError> {
        if let Some(error) = self.errors.first() {
            return Err(error.clone());
        }

        let mut board = Array2::from_elem((self.size, self.size), Cell::Free);
        let mut endpoints = Vec::with_capacity(self.termini.len());
        let mut displays = Vec::with_capacity(self.termini.len());

        for (color, (display, locations)) in self.termini.iter().enumerate() {
            for location in [locations.0, locations.1] {
                board[location.as_index()] = Cell::Terminus { color };
            }
            endpoints.push((locations.0, locations.1));
            displays.push(*display);
        }

        Ok(State::assemble(self.size, board, endpoints, displays))
    }
}
