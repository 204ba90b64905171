//! Seed types for disturbing a freshly created simulation.

use serde::{Deserialize, Serialize};

use crate::compute::Engine;

/// Complete seed specification for simulation initialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    /// Pattern to use for seeding.
    pub pattern: Pattern,
}

/// Predefined initial disturbances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// Leave every cell at rest.
    #[default]
    Rest,
    /// Square block of cells set to a density.
    DensityBlock {
        /// Top-left corner as fraction of grid size (0.0-1.0).
        corner: (f64, f64),
        /// Side length in cells.
        size: usize,
        /// Density of the block.
        density: f64,
    },
    /// Square block of cells stirred at a velocity.
    VelocityBlock {
        /// Top-left corner as fraction of grid size (0.0-1.0).
        corner: (f64, f64),
        /// Side length in cells.
        size: usize,
        /// Velocity `(ux, uy)` of the block.
        velocity: (f64, f64),
    },
    /// Sparse per-cell overrides.
    Custom {
        /// List of cell specifications.
        cells: Vec<CellSpec>,
    },
}

/// Override for a single cell in a `Custom` pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellSpec {
    pub x: isize,
    pub y: isize,
    #[serde(default)]
    pub density: Option<f64>,
    #[serde(default)]
    pub velocity: Option<(f64, f64)>,
}

impl Seed {
    /// Apply the pattern to the engine's current grid.
    ///
    /// Cells are reset to equilibrium; density is applied before velocity.
    pub fn apply(&self, engine: &mut Engine) {
        let [width, height] = engine.extents();

        match &self.pattern {
            Pattern::Rest => {}
            Pattern::DensityBlock {
                corner,
                size,
                density,
            } => {
                for coords in block(*corner, *size, width, height) {
                    engine.set_cell_density(coords, *density);
                }
            }
            Pattern::VelocityBlock {
                corner,
                size,
                velocity,
            } => {
                for coords in block(*corner, *size, width, height) {
                    engine.set_cell_velocity(coords, velocity.0, velocity.1);
                }
            }
            Pattern::Custom { cells } => {
                for spec in cells {
                    let coords = [spec.x, spec.y];
                    if let Some(rho) = spec.density {
                        engine.set_cell_density(coords, rho);
                    }
                    if let Some((ux, uy)) = spec.velocity {
                        engine.set_cell_velocity(coords, ux, uy);
                    }
                }
            }
        }
    }
}

/// Coordinates of a `size`x`size` block starting at a fractional corner.
fn block(
    corner: (f64, f64),
    size: usize,
    width: usize,
    height: usize,
) -> impl Iterator<Item = [isize; 2]> {
    let x0 = (corner.0 * width as f64).floor() as isize;
    let y0 = (corner.1 * height as f64).floor() as isize;
    let size = size as isize;

    (0..size).flat_map(move |dx| (0..size).map(move |dy| [x0 + dx, y0 + dy]))
}
