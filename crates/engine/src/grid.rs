use thiserror::Error;

/// Cell value for a live cell.
pub const ALIVE: u8 = 1;
/// Cell value for a dead cell.
pub const DEAD: u8 = 0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive (got {width}x{height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("expected {expected} cells for the grid, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("cell {index} holds {value}, expected 0 or 1")]
    InvalidCell { index: usize, value: u8 },
    #[error("cell ({x}, {y}) lies outside a {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("alive ratio must be within [0, 1] (got {0})")]
    InvalidRatio(f64),
}

/// A dense, bounded Life grid: one byte per cell, row-major.
///
/// Grids are never mutated after construction. Each generation is a brand-new
/// `Grid`, so a reader holding one can never observe a half-written state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Box<[u8]>,
}

impl Grid {
    /// Wrap an existing cell buffer. `cells.len()` must equal `width * height`.
    pub fn new(width: usize, height: usize, cells: Vec<u8>) -> Result<Self, GridError> {
        let expected = checked_area(width, height)?;
        if cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }
        if let Some((index, &value)) = cells.iter().enumerate().find(|(_, c)| **c > ALIVE) {
            return Err(GridError::InvalidCell { index, value });
        }
        Ok(Self {
            width,
            height,
            cells: cells.into_boxed_slice(),
        })
    }

    /// An all-dead grid.
    pub fn dead(width: usize, height: usize) -> Result<Self, GridError> {
        let area = checked_area(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![DEAD; area].into_boxed_slice(),
        })
    }

    /// A dead grid with the listed `(x, y)` cells alive.
    pub fn from_alive(width: usize, height: usize, alive: &[(usize, usize)]) -> Result<Self, GridError> {
        let area = checked_area(width, height)?;
        let mut cells = vec![DEAD; area];
        for &(x, y) in alive {
            if x >= width || y >= height {
                return Err(GridError::OutOfBounds { x, y, width, height });
            }
            cells[y * width + x] = ALIVE;
        }
        Ok(Self {
            width,
            height,
            cells: cells.into_boxed_slice(),
        })
    }

    /// Used by the step functions, which already produce a well-formed buffer.
    pub(crate) fn from_raw(width: usize, height: usize, cells: Vec<u8>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells: cells.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cell buffer (`index = y * width + x`).
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; both dimensions are at least 1.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    const fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Read a cell. Anything outside the grid reads as dead.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.cells[self.index(x, y)]
        } else {
            DEAD
        }
    }

    #[inline]
    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == ALIVE
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == ALIVE).count()
    }

    /// One row of the grid. `y` must be below `height`.
    pub(crate) fn row(&self, y: usize) -> &[u8] {
        let start = self.index(0, y);
        &self.cells[start..start + self.width]
    }
}

pub(crate) fn checked_area(width: usize, height: usize) -> Result<usize, GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(GridError::InvalidDimensions { width, height })
}
