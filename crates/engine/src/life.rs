//! The generation step: standard B3/S23 rules on a bounded grid.
//!
//! Positions beyond the edge count as dead; there is no wraparound. Both step
//! functions read only the input grid and write into a fresh buffer, because
//! every output cell depends on the unmodified prior state of its neighbors.

use rayon::prelude::*;

use crate::grid::{ALIVE, DEAD, Grid};

/// Grids with at least this many cells are stepped row-parallel by [`step`].
pub const PARALLEL_THRESHOLD: usize = 256 * 256;

/// Moore-neighborhood offsets, `(0, 0)` excluded.
const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// In-bounds Moore neighbors of `(x, y)` on a `width` x `height` grid.
///
/// Corners yield 3 positions, non-corner edges 5, interior cells 8.
pub fn neighbors(
    width: usize,
    height: usize,
    x: usize,
    y: usize,
) -> impl Iterator<Item = (usize, usize)> {
    OFFSETS.iter().filter_map(move |&(dx, dy)| {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < width && ny < height).then_some((nx, ny))
    })
}

/// Number of live cells around `(x, y)`.
#[inline]
pub fn live_neighbors(grid: &Grid, x: usize, y: usize) -> u8 {
    neighbors(grid.width(), grid.height(), x, y)
        .map(|(nx, ny)| grid.get(nx, ny))
        .sum()
}

/// Next state of a single cell.
#[inline]
pub fn next_cell(alive: bool, live_neighbors: u8) -> u8 {
    match (alive, live_neighbors) {
        (true, 2) | (_, 3) => ALIVE,
        _ => DEAD,
    }
}

#[inline]
fn next_row(grid: &Grid, y: usize, out: &mut [u8]) {
    for (x, cell) in out.iter_mut().enumerate() {
        *cell = next_cell(grid.is_alive(x, y), live_neighbors(grid, x, y));
    }
}

/// Compute the next generation sequentially.
pub fn next_generation(grid: &Grid) -> Grid {
    let width = grid.width();
    let mut next = vec![DEAD; grid.len()];
    for (y, row) in next.chunks_mut(width).enumerate() {
        next_row(grid, y, row);
    }
    Grid::from_raw(width, grid.height(), next)
}

/// Compute the next generation with rows spread across the rayon pool.
///
/// Produces exactly the same grid as [`next_generation`].
pub fn next_generation_parallel(grid: &Grid) -> Grid {
    let width = grid.width();
    let mut next = vec![DEAD; grid.len()];
    next.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| next_row(grid, y, row));
    Grid::from_raw(width, grid.height(), next)
}

/// Advance one generation, picking the parallel path for large grids.
pub fn step(grid: &Grid) -> Grid {
    if grid.len() >= PARALLEL_THRESHOLD {
        next_generation_parallel(grid)
    } else {
        next_generation(grid)
    }
}
