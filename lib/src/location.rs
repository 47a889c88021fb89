pub(crate) type Coord = usize;

/// A location `(row, col)` on a board. The top left corner is `Location(0, 0)`.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.0, self.1)
    }

    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    /// Distance from this location to the nearest edge of a `size`-wide board.
    pub(crate) fn min_edge_distance(&self, size: Coord) -> Coord {
        let vertical = self.0.min(size - (self.0 + 1));
        let horizontal = self.1.min(size - (self.1 + 1));
        vertical.min(horizontal)
    }

    /// Whether `other` is orthogonally adjacent to this location.
    pub(crate) fn is_orthogonal_neighbour(&self, other: Location) -> bool {
        (self.0 == other.0 && self.1.abs_diff(other.1) == 1)
            || (self.1 == other.1 && self.0.abs_diff(other.0) == 1)
    }
}
