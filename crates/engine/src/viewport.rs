use crate::grid::{DEAD, Grid};

/// Default width and height of a viewport when the caller leaves them unset.
pub const DEFAULT_SIZE: usize = 100;

/// A rectangular window onto a grid, in grid coordinates.
///
/// Nothing ties a viewport to the grid it is applied to: it may be larger,
/// smaller, or lie partly or entirely outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub offset_x: usize,
    pub offset_y: usize,
    pub cols: usize,
    pub rows: usize,
}

impl Viewport {
    pub const fn new(offset_x: usize, offset_y: usize, cols: usize, rows: usize) -> Self {
        Self {
            offset_x,
            offset_y,
            cols,
            rows,
        }
    }

    /// Size of the extracted bitmap, or `None` if it does not fit in `usize`.
    pub fn cell_count(&self) -> Option<usize> {
        self.cols.checked_mul(self.rows)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 0, DEFAULT_SIZE, DEFAULT_SIZE)
    }
}

/// Copy the viewport's cells out of `grid`, row-major, `cols * rows` bytes.
///
/// Cells outside the grid come back dead. Panics if `cols * rows` overflows;
/// check [`Viewport::cell_count`] first for untrusted input.
pub fn extract(grid: &Grid, viewport: &Viewport) -> Vec<u8> {
    let len = viewport
        .cell_count()
        .expect("viewport area overflows usize");
    let mut out = vec![DEAD; len];
    if viewport.cols == 0 {
        return out;
    }

    // Only the overlap between the viewport and the grid needs copying.
    let x_end = viewport
        .offset_x
        .saturating_add(viewport.cols)
        .min(grid.width());
    if viewport.offset_x >= x_end {
        return out;
    }
    let copy_cols = x_end - viewport.offset_x;

    for (y, dst) in out.chunks_mut(viewport.cols).enumerate() {
        let gy = viewport.offset_y.saturating_add(y);
        if gy >= grid.height() {
            break;
        }
        let src = &grid.row(gy)[viewport.offset_x..x_end];
        dst[..copy_cols].copy_from_slice(src);
    }
    out
}
