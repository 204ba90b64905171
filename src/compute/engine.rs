//! Lattice Boltzmann engine - double-buffered collide + stream driver.
//!
//! Owns two grids. Collision relaxes every cell of the current grid in
//! place; streaming pulls each component from the upstream neighbour into
//! the next grid, then the two grids swap roles.

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::schema::{ConfigError, SimulationConfig, check_viscosity};

use super::{Cell, Direction, Grid, Q, RenderError, SimulationStats, validate_extents};

/// Number of axes the engine supports.
pub const DIMENSIONS: usize = 2;

/// D2Q9 lattice Boltzmann simulation on a periodic 2D grid.
pub struct Engine {
    /// Both buffers; `grids[current]` holds the live state.
    grids: [Grid<Cell>; 2],
    current: usize,
    /// For each linear index, the source index of every direction's component.
    neighbors: Vec<[usize; Q]>,
    /// Every coordinate in row-major order.
    coords: Vec<[usize; DIMENSIONS]>,
    viscosity: f64,
    omega: f64,
    step: u64,
}

impl Engine {
    /// Create an engine with every cell at rest (density 1, velocity 0).
    ///
    /// `extents` must name exactly two positive axes, and `viscosity` must
    /// give a relaxation factor inside (0, 2).
    pub fn new(extents: &[usize], viscosity: f64) -> Result<Self, ConfigError> {
        validate_extents(extents)?;
        if extents.len() != DIMENSIONS {
            return Err(ConfigError::UnsupportedDimensionality {
                expected: DIMENSIONS,
                actual: extents.len(),
            });
        }
        let omega = check_viscosity(viscosity)?;

        let current = Grid::from_fn(extents, Cell::at_rest)?;
        let next = Grid::from_fn(extents, Cell::at_rest)?;

        let coords: Vec<[usize; DIMENSIONS]> = current
            .coords()
            .map(|c| [c[0], c[1]])
            .collect();

        // Streaming pulls direction d from the cell one step against d.
        let neighbors: Vec<[usize; Q]> = coords
            .iter()
            .map(|&[x, y]| {
                Direction::ALL.map(|d| {
                    let [dx, dy] = d.offset();
                    current.offset(&[x as isize - dx, y as isize - dy])
                })
            })
            .collect();

        log::debug!(
            "Created {}x{} lattice engine (viscosity={}, omega={:.4})",
            extents[0],
            extents[1],
            viscosity,
            omega
        );

        Ok(Self {
            grids: [current, next],
            current: 0,
            neighbors,
            coords,
            viscosity,
            omega,
            step: 0,
        })
    }

    /// Create an engine from a validated configuration.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(&config.extents(), config.viscosity)
    }

    /// Perform one collide + stream cycle.
    pub fn step(&mut self) {
        self.collide_phase();
        self.stream_phase();
        self.step += 1;
        log::trace!("Step {} complete", self.step);
    }

    /// Run the simulation for the given number of steps.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Relax every cell of the current grid towards equilibrium.
    pub fn collide_phase(&mut self) {
        let omega = self.omega;
        let cells = self.grids[self.current].as_mut_slice();

        #[cfg(not(target_arch = "wasm32"))]
        cells.par_iter_mut().for_each(|cell| cell.relax(omega));

        #[cfg(target_arch = "wasm32")]
        cells.iter_mut().for_each(|cell| cell.relax(omega));
    }

    /// Move every component one cell along its direction, then swap buffers.
    ///
    /// The rest component stays in place.
    pub fn stream_phase(&mut self) {
        let [a, b] = &mut self.grids;
        let (source, target) = if self.current == 0 {
            (a.as_slice(), b.as_mut_slice())
        } else {
            (b.as_slice(), a.as_mut_slice())
        };
        let neighbors = &self.neighbors;

        #[cfg(not(target_arch = "wasm32"))]
        target
            .par_iter_mut()
            .zip(neighbors.par_iter())
            .for_each(|(cell, hood)| {
                cell.set_components(std::array::from_fn(|d| source[hood[d]].components()[d]));
            });

        #[cfg(target_arch = "wasm32")]
        target
            .iter_mut()
            .zip(neighbors.iter())
            .for_each(|(cell, hood)| {
                cell.set_components(std::array::from_fn(|d| source[hood[d]].components()[d]));
            });

        // Swap roles (no copy)
        self.current ^= 1;
    }

    /// Grid holding the live state.
    #[inline]
    pub fn grid(&self) -> &Grid<Cell> {
        &self.grids[self.current]
    }

    /// Cell at `coords` (wrapped).
    pub fn cell(&self, coords: [isize; DIMENSIONS]) -> &Cell {
        self.grid().at(&coords)
    }

    /// Mutable cell at `coords` (wrapped) for direct disturbance.
    pub fn cell_mut(&mut self, coords: [isize; DIMENSIONS]) -> &mut Cell {
        self.grids[self.current].at_mut(&coords)
    }

    /// Reset the cell at `coords` to equilibrium at the given velocity,
    /// keeping its density.
    pub fn set_cell_velocity(&mut self, coords: [isize; DIMENSIONS], ux: f64, uy: f64) {
        self.cell_mut(coords).set_velocity(ux, uy);
    }

    /// Reset the cell at `coords` to equilibrium at the given density,
    /// keeping its velocity.
    pub fn set_cell_density(&mut self, coords: [isize; DIMENSIONS], rho: f64) {
        self.cell_mut(coords).set_density(rho);
    }

    /// Total mass of the current grid.
    pub fn mass(&self) -> f64 {
        self.grid().sum(Cell::density)
    }

    /// Mean velocity over the current grid.
    pub fn average_velocity(&self) -> (f64, f64) {
        let grid = self.grid();
        let (sx, sy) = grid.reduce((0.0f64, 0.0f64), Cell::velocity, |(ax, ay), (ux, uy)| {
            (ax + ux, ay + uy)
        });
        let n = grid.len() as f64;
        (sx / n, sy / n)
    }

    /// Aggregate diagnostics of the current grid.
    pub fn stats(&self) -> SimulationStats {
        let stats = SimulationStats::from_engine(self);
        if !stats.is_finite() {
            log::warn!("Non-finite state at step {}: {:?}", self.step, stats);
        }
        stats
    }

    /// RGBA bytes of the density field, one pixel per cell in row-major order.
    pub fn render_buffer(&self) -> Vec<u8> {
        super::render_density(self.grid().as_slice())
    }

    /// Render into a caller-provided buffer of `4 * cell_count` bytes.
    pub fn render_into(&self, out: &mut [u8]) -> Result<(), RenderError> {
        super::render_density_into(self.grid().as_slice(), out)
    }

    /// Grid extents `[width, height]`.
    pub fn extents(&self) -> [usize; DIMENSIONS] {
        let e = self.grid().extents();
        [e[0], e[1]]
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.coords.len()
    }

    /// Every coordinate in row-major order.
    pub fn coords(&self) -> &[[usize; DIMENSIONS]] {
        &self.coords
    }

    /// Kinematic viscosity.
    pub fn viscosity(&self) -> f64 {
        self.viscosity
    }

    /// Relaxation factor derived from the viscosity.
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Number of completed steps.
    pub fn step_count(&self) -> u64 {
        self.step
    }
}
