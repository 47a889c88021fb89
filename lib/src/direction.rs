use strum::VariantArray;

use crate::location::Location;

#[derive(Copy, Clone, Debug, Eq, Hash, VariantArray, PartialEq)]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(&self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// Attempt the step from `location`, returning `None` when it would leave
    /// a `size`-wide board.
    pub(crate) fn attempt_from(&self, location: Location, size: usize) -> Option<Location> {
        self.attempt_ray(location, 1, size)
    }

    /// Attempt `distance` straight steps from `location` in one jump.
    pub(crate) fn attempt_ray(&self, location: Location, distance: usize, size: usize) -> Option<Location> {
        let (dr, dc) = self.delta();
        let stepped = location.offset_by((dr * distance as isize, dc * distance as isize));

        match stepped.0 < size && stepped.1 < size {
            true => Some(stepped),
            false => None,
        }
    }
}
