//! Generation-step tests on small hand-built grids. No randomness here except
//! in the parallel/sequential comparison, which uses a fixed seed.

use life_engine::factory;
use life_engine::grid::{ALIVE, DEAD, Grid, GridError};
use life_engine::life::{self, live_neighbors, neighbors, next_cell};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn alive_set(grid: &Grid) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.is_alive(x, y) {
                out.push((x, y));
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Grid construction
// ---------------------------------------------------------------------------

#[test]
fn grid_rejects_zero_dimensions() {
    assert_eq!(
        Grid::dead(0, 5),
        Err(GridError::InvalidDimensions { width: 0, height: 5 })
    );
    assert!(Grid::dead(5, 0).is_err());
    assert!(Grid::new(0, 0, vec![]).is_err());
}

#[test]
fn grid_rejects_wrong_buffer_length() {
    let err = Grid::new(3, 3, vec![0; 8]).unwrap_err();
    assert_eq!(err, GridError::CellCountMismatch { expected: 9, actual: 8 });
}

#[test]
fn grid_rejects_non_binary_cells() {
    let err = Grid::new(2, 1, vec![0, 7]).unwrap_err();
    assert_eq!(err, GridError::InvalidCell { index: 1, value: 7 });
}

#[test]
fn grid_from_alive_rejects_outside_cells() {
    assert!(matches!(
        Grid::from_alive(3, 3, &[(3, 0)]),
        Err(GridError::OutOfBounds { x: 3, y: 0, .. })
    ));
}

#[test]
fn grid_is_row_major() {
    let grid = Grid::from_alive(4, 3, &[(1, 2)]).unwrap();
    assert_eq!(grid.cells()[2 * 4 + 1], ALIVE);
    assert_eq!(grid.alive_count(), 1);
    assert_eq!(grid.get(10, 10), DEAD);
}

// ---------------------------------------------------------------------------
// Neighborhood
// ---------------------------------------------------------------------------

#[test]
fn neighbor_positions_corner_edge_interior() {
    let (w, h) = (4, 4);
    for &(x, y) in &[(0, 0), (3, 0), (0, 3), (3, 3)] {
        assert_eq!(neighbors(w, h, x, y).count(), 3, "corner ({x}, {y})");
    }
    for &(x, y) in &[(1, 0), (2, 0), (0, 1), (0, 2), (3, 1), (3, 2), (1, 3), (2, 3)] {
        assert_eq!(neighbors(w, h, x, y).count(), 5, "edge ({x}, {y})");
    }
    for &(x, y) in &[(1, 1), (2, 1), (1, 2), (2, 2)] {
        assert_eq!(neighbors(w, h, x, y).count(), 8, "interior ({x}, {y})");
    }
}

#[test]
fn neighbor_positions_exclude_self() {
    assert!(neighbors(5, 5, 2, 2).all(|p| p != (2, 2)));
}

#[test]
fn single_cell_grid_has_no_neighbors() {
    assert_eq!(neighbors(1, 1, 0, 0).count(), 0);
}

#[test]
fn live_neighbors_on_full_grid() {
    let full = Grid::new(3, 3, vec![ALIVE; 9]).unwrap();
    assert_eq!(live_neighbors(&full, 0, 0), 3);
    assert_eq!(live_neighbors(&full, 1, 0), 5);
    assert_eq!(live_neighbors(&full, 1, 1), 8);
}

#[test]
fn no_wraparound() {
    // A live column on the left edge must not count as a neighbor of the right edge.
    let grid = Grid::from_alive(4, 3, &[(0, 0), (0, 1), (0, 2)]).unwrap();
    assert_eq!(live_neighbors(&grid, 3, 1), 0);
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[test]
fn rule_table() {
    for n in 0..=8u8 {
        let birth = next_cell(false, n);
        let survive = next_cell(true, n);
        assert_eq!(birth, if n == 3 { ALIVE } else { DEAD }, "dead with {n}");
        assert_eq!(
            survive,
            if n == 2 || n == 3 { ALIVE } else { DEAD },
            "alive with {n}"
        );
    }
}

#[test]
fn all_dead_is_fixed_point() {
    let grid = Grid::dead(7, 5).unwrap();
    assert_eq!(life::next_generation(&grid), grid);
}

#[test]
fn isolated_cell_dies() {
    let grid = Grid::from_alive(5, 5, &[(2, 2)]).unwrap();
    assert_eq!(life::next_generation(&grid).alive_count(), 0);
}

#[test]
fn cell_with_one_neighbor_dies() {
    let grid = Grid::from_alive(5, 5, &[(2, 2), (3, 2)]).unwrap();
    assert_eq!(life::next_generation(&grid).alive_count(), 0);
}

#[test]
fn dead_cell_with_three_neighbors_is_born() {
    let grid = Grid::from_alive(5, 5, &[(1, 1), (3, 1), (2, 3)]).unwrap();
    let next = life::next_generation(&grid);
    assert!(next.is_alive(2, 2));
}

#[test]
fn live_cell_with_three_neighbors_survives() {
    let grid = Grid::from_alive(5, 5, &[(2, 2), (1, 1), (3, 1), (2, 3)]).unwrap();
    assert!(life::next_generation(&grid).is_alive(2, 2));
}

#[test]
fn live_cell_with_four_neighbors_dies() {
    let grid = Grid::from_alive(5, 5, &[(2, 2), (1, 1), (3, 1), (1, 3), (3, 3)]).unwrap();
    assert!(!life::next_generation(&grid).is_alive(2, 2));
}

#[test]
fn block_is_still_life_in_corner() {
    let grid = Grid::from_alive(4, 4, &[(0, 0), (1, 0), (0, 1), (1, 1)]).unwrap();
    assert_eq!(life::next_generation(&grid), grid);
}

#[test]
fn blinker_oscillates() {
    let horizontal = Grid::from_alive(5, 5, &[(1, 2), (2, 2), (3, 2)]).unwrap();
    let gen1 = life::next_generation(&horizontal);
    assert_eq!(alive_set(&gen1), vec![(2, 1), (2, 2), (2, 3)]);
    let gen2 = life::next_generation(&gen1);
    assert_eq!(gen2, horizontal);
}

#[test]
fn step_leaves_input_untouched() {
    let grid = Grid::from_alive(5, 5, &[(1, 2), (2, 2), (3, 2)]).unwrap();
    let before = grid.clone();
    let _ = life::next_generation(&grid);
    let _ = life::next_generation_parallel(&grid);
    assert_eq!(grid, before);
}

#[test]
fn glider_reaches_edge_and_settles() {
    // Without wraparound a glider hitting the bottom-right corner turns into a block.
    let mut grid = Grid::from_alive(6, 6, &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]).unwrap();
    for _ in 0..40 {
        grid = life::next_generation(&grid);
    }
    assert_eq!(alive_set(&grid), vec![(4, 4), (5, 4), (4, 5), (5, 5)]);
}

#[test]
fn parallel_matches_sequential() {
    let mut seq = factory::seeded_grid(97, 61, 0.35, 7).unwrap();
    let mut par = seq.clone();
    for _ in 0..10 {
        seq = life::next_generation(&seq);
        par = life::next_generation_parallel(&par);
        assert_eq!(seq, par);
    }
}

#[test]
fn step_picks_same_result_either_side_of_threshold() {
    let big = factory::seeded_grid(512, 130, 0.3, 11).unwrap();
    assert!(big.len() >= life::PARALLEL_THRESHOLD);
    assert_eq!(life::step(&big), life::next_generation(&big));

    let small = factory::seeded_grid(16, 16, 0.3, 11).unwrap();
    assert_eq!(life::step(&small), life::next_generation(&small));
}
