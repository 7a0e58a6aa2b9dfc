use std::fmt;

use bevy::log::debug;

use crate::grid::Grid;

/// Preset seed patterns. Each is a fixed set of `(row, col)` offsets placed
/// relative to an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Glider,
    SmallExploder,
    Exploder,
    TenCellRow,
    LightweightSpaceship,
    Block,
    Tub,
    Boat,
}

impl Pattern {
    pub const ALL: [Pattern; 8] = [
        Pattern::Glider,
        Pattern::SmallExploder,
        Pattern::Exploder,
        Pattern::TenCellRow,
        Pattern::LightweightSpaceship,
        Pattern::Block,
        Pattern::Tub,
        Pattern::Boat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Glider => "glider",
            Pattern::SmallExploder => "small-exploder",
            Pattern::Exploder => "exploder",
            Pattern::TenCellRow => "ten-cell-row",
            Pattern::LightweightSpaceship => "lightweight-spaceship",
            Pattern::Block => "block",
            Pattern::Tub => "tub",
            Pattern::Boat => "boat",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Where the pattern is placed when no origin is given, tuned for a 20x20 board.
    pub fn default_origin(self) -> (usize, usize) {
        match self {
            Pattern::SmallExploder => (7, 9),
            Pattern::TenCellRow => (9, 5),
            Pattern::Block => (9, 9),
            _ => (8, 8),
        }
    }

    #[rustfmt::skip]
    pub fn offsets(self) -> &'static [(usize, usize)] {
        match self {
            Pattern::Glider => &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
            Pattern::SmallExploder => &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 0), (2, 2), (3, 1)],
            Pattern::Exploder => &[
                (0, 0), (0, 2), (0, 4),
                (1, 0), (1, 4),
                (2, 0), (2, 4),
                (3, 0), (3, 4),
                (4, 0), (4, 2), (4, 4),
            ],
            Pattern::TenCellRow => &[
                (0, 0), (0, 1), (0, 2), (0, 3), (0, 4),
                (0, 5), (0, 6), (0, 7), (0, 8), (0, 9),
            ],
            Pattern::LightweightSpaceship => &[
                (0, 1), (0, 2), (0, 3), (0, 4),
                (1, 0), (1, 4),
                (2, 4),
                (3, 0), (3, 3),
            ],
            Pattern::Block => &[(0, 0), (0, 1), (1, 0), (1, 1)],
            Pattern::Tub => &[(0, 1), (1, 0), (1, 2), (2, 1)],
            Pattern::Boat => &[(0, 1), (1, 0), (1, 2), (2, 1), (2, 2)],
        }
    }

    /// A grid of `size` with the pattern at its default origin.
    pub fn seed(self, size: usize) -> Grid {
        self.seed_at(size, self.default_origin())
    }

    /// A grid of `size` with the pattern placed at `origin`. Cells that fall
    /// past the board edge are dropped.
    pub fn seed_at(self, size: usize, origin: (usize, usize)) -> Grid {
        let mut grid = Grid::empty(size);
        let mut clipped = 0;
        for &(dr, dc) in self.offsets() {
            if grid.set(origin.0 + dr, origin.1 + dc, true).is_err() {
                clipped += 1;
            }
        }
        if clipped > 0 {
            debug!("{self} clipped {clipped} cells on a {size}x{size} grid");
        }
        grid
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&p| p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Seeds a grid by pattern name. Unknown names give an empty grid.
pub fn pattern_grid(name: &str, size: usize) -> Grid {
    match Pattern::from_name(name) {
        Some(pattern) => pattern.seed(size),
        None => {
            debug!("unknown pattern {name:?}, using an empty grid");
            Grid::empty(size)
        }
    }
}
