//! Compute module - Lattice Boltzmann numerics.

mod cell;
mod engine;
mod grid;
mod render;
mod stats;

pub use cell::*;
pub use engine::*;
pub use grid::*;
pub use render::*;
pub use stats::*;
