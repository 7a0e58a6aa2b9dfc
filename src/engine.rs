//! Generation transitions on a toroidal board.

use bevy::log::debug;

use crate::grid::{Grid, ALIVE, DEAD};

/// Number of alive cells among the 8 wrapped neighbours of (row, col).
#[inline]
pub fn live_neighbours(grid: &Grid, row: usize, col: usize) -> u8 {
    let cells = grid.cells();
    grid.neighbour_indices(row, col)
        .iter()
        .map(|&idx| cells[idx])
        .sum()
}

/// Computes the next generation under Conway's rules. The input is left
/// untouched.
pub fn step(grid: &Grid) -> Grid {
    assert!(grid.size() > 0, "cannot step an empty grid");

    let mut next = grid.clone();
    for (idx, cell) in next.cells_mut().iter_mut().enumerate() {
        let (row, col) = grid.idx_to_coord(idx);
        let nval = live_neighbours(grid, row, col);

        // alive cells are checked first, a dead cell is born only at exactly 3
        if *cell == ALIVE && nval != 2 && nval != 3 {
            *cell = DEAD;
        } else if *cell == DEAD && nval == 3 {
            *cell = ALIVE;
        }
    }
    next
}

/// Brings one uniformly chosen dead cell to life. Returns the chosen
/// coordinate, or `None` when every cell is already alive.
pub fn inject_random_life(grid: &mut Grid, rng: &mut fastrand::Rng) -> Option<(usize, usize)> {
    let dead = grid
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == DEAD)
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>();
    if dead.is_empty() {
        debug!("no dead cell left for random life");
        return None;
    }

    let idx = dead[rng.usize(..dead.len())];
    grid.cells_mut()[idx] = ALIVE;
    let coord = grid.idx_to_coord(idx);
    debug!("random life at {:?}", coord);
    Some(coord)
}

/// One tick of the transition engine: `step`, then, if `random_life` is set,
/// a single injection into the freshly computed generation.
pub fn next_generation(grid: &Grid, random_life: bool, rng: &mut fastrand::Rng) -> Grid {
    let mut next = step(grid);
    if random_life {
        inject_random_life(&mut next, rng);
    }
    next
}
