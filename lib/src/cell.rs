use std::fmt::{Display, Formatter};

/// Identifies one color (one agent) on a board. Valid ids are `0..num_colors`.
pub type ColorId = usize;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) enum Cell {
    /// One of the two fixed endpoints of a color.
    Terminus { color: ColorId },
    /// A square claimed by a color's flow on the way to its target.
    Path { color: ColorId },
    #[default]
    Free,
}

impl Cell {
    pub(crate) fn color(&self) -> Option<ColorId> {
        match self {
            Cell::Terminus { color } | Cell::Path { color } => Some(*color),
            Cell::Free => None,
        }
    }

    pub(crate) fn is_free(&self) -> bool {
        matches!(self, Cell::Free)
    }
}

/// Renders one cell given the display characters assigned per color:
/// termini uppercase, paths lowercase, free squares as `.`.
pub(crate) struct CellDisplay<'a> {
    pub(crate) cell: Cell,
    pub(crate) displays: &'a [char],
}

impl Display for CellDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self.cell {
            Cell::Terminus { color } => self.displays[color].to_ascii_uppercase(),
            Cell::Path { color } => self.displays[color].to_ascii_lowercase(),
            Cell::Free => '.',
        })
    }
}
