//! Conway's Game of Life on bounded grids.
//!
//! Everything here is synchronous and transport-free: the server crate owns
//! sessions, timers and subscribers, and calls into this crate for the actual
//! cell arithmetic.

pub mod factory;
pub mod grid;
pub mod life;
pub mod viewport;

pub use grid::{Grid, GridError};
pub use viewport::Viewport;
