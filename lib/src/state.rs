use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use ndarray::Array2;
use strum::VariantArray;
use tracing::warn;

use crate::cell::{Cell, CellDisplay, ColorId};
use crate::direction::Direction;
use crate::location::Location;

/// The tip of the flow currently being extended, owned by exactly one agent.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct Head {
    pub(crate) at: Location,
    pub(crate) color: ColorId,
}

/// What [`State::perform_move`] did, reported back so the expanding agent can
/// update its own bookkeeping. The state never mutates an agent.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct MoveOutcome {
    /// The move landed on the mover's target square.
    pub(crate) reached_target: bool,
    /// The move was the only continuation and does not count towards `g`.
    pub(crate) forced: bool,
}

/// One search node: a full board snapshot plus the A* bookkeeping for the
/// agent expanding it.
///
/// `g` counts only the moves the active agent chose freely; forced moves and
/// the move that completes a flow are not charged. `h` is the number of free
/// squares left, so `g + h` is the heap priority throughout the search.
#[derive(Clone, Debug)]
pub struct State {
    pub(crate) size: usize,
    pub(crate) board: Array2<Cell>,
    pub(crate) sources: Vec<Location>,
    pub(crate) targets: Vec<Location>,
    pub(crate) finished: Vec<bool>,
    pub(crate) head: Option<Head>,
    pub(crate) g: usize,
    pub(crate) h: usize,
    pub(crate) displays: Vec<char>,
}

impl State {
    /// Assemble a fresh state from builder output and apply the endpoint swap
    /// rule: for every color the source must be the endpoint nearer the board
    /// edge, so search starts against a wall rather than in the open.
    pub(crate) fn assemble(
        size: usize,
        board: Array2<Cell>,
        endpoints: Vec<(Location, Location)>,
        displays: Vec<char>,
    ) -> Self {
        let num_colors = endpoints.len();
        let (mut sources, mut targets): (Vec<_>, Vec<_>) = endpoints.into_iter().unzip();

        for color in 0..num_colors {
            if targets[color].min_edge_distance(size) < sources[color].min_edge_distance(size) {
                std::mem::swap(&mut sources[color], &mut targets[color]);
            }
        }

        Self {
            size,
            board,
            sources,
            targets,
            finished: vec![false; num_colors],
            head: None,
            g: 0,
            h: size * size - 2 * num_colors,
            displays,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn num_colors(&self) -> usize {
        self.sources.len()
    }

    /// Free squares remaining; zero on a goal board.
    pub fn remaining_free(&self) -> usize {
        self.h
    }

    pub fn is_finished(&self, color: ColorId) -> bool {
        self.finished[color]
    }

    /// The color occupying `location`, if any.
    pub fn color_at(&self, location: Location) -> Option<ColorId> {
        self.board[location.as_index()].color()
    }

    /// The `(source, target)` endpoints of `color`, post swap rule.
    pub fn endpoints(&self, color: ColorId) -> (Location, Location) {
        (self.sources[color], self.targets[color])
    }

    pub(crate) fn f(&self) -> usize {
        self.g + self.h
    }

    pub(crate) fn player(&self) -> Option<ColorId> {
        self.head.map(|head| head.color)
    }

    pub(crate) fn cell(&self, location: Location) -> Cell {
        self.board[location.as_index()]
    }

    pub(crate) fn in_bounds(&self, location: Location) -> bool {
        location.0 < self.size && location.1 < self.size
    }

    /// In-bounds orthogonal neighbours of `location`.
    pub(crate) fn neighbours(&self, location: Location) -> impl Iterator<Item = Location> + '_ {
        Direction::VARIANTS.iter().filter_map(move |dir| dir.attempt_from(location, self.size))
    }

    /// Place the active head on an already-colored square; the owning player
    /// is read off the board.
    pub(crate) fn set_head(&mut self, at: Location) {
        let color = self.cell(at).color().expect("head must be placed on a colored square");
        self.head = Some(Head { at, color });
    }

    /// A move is valid when the square is in bounds, free, and extends the
    /// active player's flow (some orthogonal neighbour carries that color).
    pub(crate) fn check_move_valid(&self, location: Location) -> bool {
        let Some(player) = self.player() else {
            return false;
        };

        self.in_bounds(location)
            && self.cell(location).is_free()
            && self.neighbours(location).any(|n| self.cell(n).color() == Some(player))
    }

    pub(crate) fn num_free_neighbours(&self, location: Location) -> usize {
        self.neighbours(location).filter(|n| self.cell(*n).is_free()).count()
    }

    /// An agent's goal: its head sits orthogonally adjacent to its target.
    /// The target square itself is never entered; it is already colored.
    pub(crate) fn is_agent_goal_state(&self, color: ColorId) -> bool {
        match self.head {
            Some(head) if head.color == color => {
                head.at.is_orthogonal_neighbour(self.targets[color])
            }
            _ => false,
        }
    }

    /// The valid continuations of the active flow from its head.
    pub(crate) fn possible_moves(&self) -> Vec<Location> {
        let Some(head) = self.head else {
            return Vec::new();
        };

        Direction::VARIANTS
            .iter()
            .filter_map(|dir| dir.attempt_from(head.at, self.size))
            .filter(|loc| self.check_move_valid(*loc))
            .collect()
    }

    /// Extend `color`'s flow onto `location`, updating the head and the cost
    /// bookkeeping. Invalid moves are rejected with a warning and leave the
    /// state untouched; upstream filtering should have prevented them.
    pub(crate) fn perform_move(&mut self, location: Location, color: ColorId) -> Option<MoveOutcome> {
        if !self.check_move_valid(location) || color >= self.num_colors() {
            warn!(row = location.0, col = location.1, color, "illegal move was not played");
            return None;
        }

        debug_assert!(self.h > 0, "free-cell count would go negative");
        self.board[location.as_index()] = Cell::Path { color };
        self.head = Some(Head { at: location, color });
        self.h -= 1;

        if location == self.targets[color] {
            self.finished[color] = true;
            return Some(MoveOutcome { reached_target: true, forced: false });
        }

        let successors = self.possible_moves();
        let forced = successors.len() == 1
            || self.num_free_neighbours(location) == 1
            || self.is_agent_goal_state(color);
        if !forced && successors.len() > 1 {
            self.g += 1;
        }

        Some(MoveOutcome { reached_target: false, forced })
    }

    /// Whether some orthogonal neighbour of `location` is an endpoint of a
    /// color that has not finished its flow yet.
    pub(crate) fn edgepoints_neighbour_didnt_finish(&self, location: Location) -> bool {
        self.neighbours(location).any(|n| match self.cell(n) {
            Cell::Terminus { color } => !self.finished[color],
            _ => false,
        })
    }

    pub(crate) fn is_head_a_neighbour(&self, location: Location) -> bool {
        self.head.is_some_and(|head| head.at.is_orthogonal_neighbour(location))
    }

    pub(crate) fn same_board(&self, other: &State) -> bool {
        self.board == other.board
    }

    /// Identity of this node for the closed set: board contents plus the
    /// active head, so identical boards reached by different players do not
    /// suppress one another.
    pub(crate) fn signature(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for cell in self.board.iter() {
            cell.hash(&mut hasher);
        }
        self.head.hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.f() == other.f() && self.same_board(other)
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.board.rows() {
            for cell in row {
                write!(f, "{}", CellDisplay { cell: *cell, displays: &self.displays })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
