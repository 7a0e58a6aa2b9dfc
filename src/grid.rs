use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ALIVE: u8 = 1;
pub const DEAD: u8 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no rows")]
    Empty,
    #[error("row {row} has {len} cells, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
    #[error("cell ({row}, {col}) holds {value}, only 0 and 1 are allowed")]
    InvalidCell { row: usize, col: usize, value: u8 },
    #[error("cell ({row}, {col}) is {ch:?}, expected '#' or '.'")]
    InvalidChar { row: usize, col: usize, ch: char },
    #[error("cell ({row}, {col}) is outside a {size}x{size} grid")]
    OutOfBounds { row: usize, col: usize, size: usize },
}

/// A square board of cells, stored row-major. Every cell is either 0 or 1.
///
/// Encoded as an array of row arrays, e.g. `[[0,1],[1,0]]`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Grid {
    /// cells per side
    size: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// An all-dead grid. Panics on `size == 0`.
    pub fn empty(size: usize) -> Self {
        assert!(size > 0, "grid size must be at least 1");
        Self {
            size,
            cells: vec![DEAD; size * size],
        }
    }

    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, GridError> {
        let size = rows.len();
        if size == 0 {
            return Err(GridError::Empty);
        }
        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(GridError::NotSquare {
                    row,
                    len: values.len(),
                    size,
                });
            }
            if let Some((col, &value)) = values.iter().enumerate().find(|(_, v)| **v > ALIVE) {
                return Err(GridError::InvalidCell { row, col, value });
            }
            cells.extend(values);
        }
        Ok(Self { size, cells })
    }

    /// Parses rows drawn with `#` for alive and `.` for dead.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, GridError> {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, ch)| match ch {
                        '#' => Ok(ALIVE),
                        '.' => Ok(DEAD),
                        _ => Err(GridError::InvalidChar { row, col, ch }),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(rows)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn coord_to_idx(&self, row: usize, col: usize) -> usize {
        (row % self.size) * self.size + (col % self.size)
    }

    #[inline]
    pub fn idx_to_coord(&self, idx: usize) -> (usize, usize) {
        (idx / self.size, idx % self.size)
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    /// Cell value at (row, col). Panics when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        assert!(self.contains(row, col), "({row}, {col}) outside grid");
        self.cells[row * self.size + col]
    }

    #[inline]
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == ALIVE
    }

    pub fn set(&mut self, row: usize, col: usize, alive: bool) -> Result<(), GridError> {
        if !self.contains(row, col) {
            return Err(self.out_of_bounds(row, col));
        }
        self.cells[row * self.size + col] = if alive { ALIVE } else { DEAD };
        Ok(())
    }

    /// Flips a cell and returns its new state.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<bool, GridError> {
        if !self.contains(row, col) {
            return Err(self.out_of_bounds(row, col));
        }
        let alive = !self.is_alive(row, col);
        self.set(row, col, alive)?;
        Ok(alive)
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == ALIVE).count()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(self.size)
    }

    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.rows().map(<[u8]>::to_vec).collect()
    }

    /// A copy of this grid with `new_size` cells per side. Cells inside both
    /// bounds keep their value, new cells are dead, excess cells are dropped.
    pub fn resized(&self, new_size: usize) -> Self {
        let mut resized = Self::empty(new_size);
        let keep = self.size.min(new_size);
        for row in 0..keep {
            let src = &self.cells[row * self.size..row * self.size + keep];
            resized.cells[row * new_size..row * new_size + keep].copy_from_slice(src);
        }
        resized
    }

    /// Indices of the 8 cells around (row, col), wrapping past each edge onto
    /// the opposite one.
    #[inline]
    pub fn neighbour_indices(&self, row: usize, col: usize) -> [usize; 8] {
        let last = self.size - 1;
        let mut result = [0; 8];
        for (i, (dr, dc)) in (-1i8..=1)
            .flat_map(|dr| (-1i8..=1).map(move |dc| (dr, dc)))
            // filter out if the offset is (0, 0)
            .filter(|&(dr, dc)| !(dr == 0 && dc == 0))
            .enumerate()
        {
            let neigh_row = match dr {
                -1 if row == 0 => last,
                -1 => row - 1,
                1 if row == last => 0,
                1 => row + 1,
                _ => row,
            };
            let neigh_col = match dc {
                -1 if col == 0 => last,
                -1 => col - 1,
                1 if col == last => 0,
                1 => col + 1,
                _ => col,
            };
            result[i] = self.coord_to_idx(neigh_row, neigh_col);
        }
        result
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> GridError {
        GridError::OutOfBounds {
            row,
            col,
            size: self.size,
        }
    }
}

impl TryFrom<Vec<Vec<u8>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<u8>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &cell in row {
                f.write_str(if cell == ALIVE { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid({0}x{0})", self.size)?;
        fmt::Display::fmt(self, f)
    }
}
