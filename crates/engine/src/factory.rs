//! Random initial grids.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::grid::{ALIVE, DEAD, Grid, GridError, checked_area};

/// Probability that a freshly seeded cell starts alive.
pub const DEFAULT_ALIVE_RATIO: f64 = 0.25;

/// Seed every cell independently: alive with probability `alive_ratio`.
pub fn random_grid<R: Rng>(
    width: usize,
    height: usize,
    alive_ratio: f64,
    rng: &mut R,
) -> Result<Grid, GridError> {
    if !(0.0..=1.0).contains(&alive_ratio) {
        return Err(GridError::InvalidRatio(alive_ratio));
    }
    let area = checked_area(width, height)?;
    let cells: Vec<u8> = (0..area)
        .map(|_| if rng.gen_bool(alive_ratio) { ALIVE } else { DEAD })
        .collect();
    let grid = Grid::from_raw(width, height, cells);
    tracing::debug!(
        "Seeded {}x{} grid: {} of {} cells alive",
        width,
        height,
        grid.alive_count(),
        grid.len()
    );
    Ok(grid)
}

/// Seed a grid from the thread-local RNG.
pub fn generate_initial_grid(width: usize, height: usize, alive_ratio: f64) -> Result<Grid, GridError> {
    random_grid(width, height, alive_ratio, &mut rand::thread_rng())
}

/// Reproducible seeding: the same `seed` always yields the same grid.
pub fn seeded_grid(width: usize, height: usize, alive_ratio: f64, seed: u64) -> Result<Grid, GridError> {
    random_grid(width, height, alive_ratio, &mut StdRng::seed_from_u64(seed))
}
