//! Lattice Fluid - 2D lattice Boltzmann fluid simulation.
//!
//! This crate implements the D2Q9 lattice Boltzmann method on a periodic
//! grid. Every cell tracks nine discretized density components; macroscopic
//! density and velocity emerge as their moments. Each step relaxes every
//! cell towards equilibrium (collision) and then moves each component one
//! cell along its direction (streaming).
//!
//! # Architecture
//!
//! - `schema`: Configuration types and initial disturbances
//! - `compute`: Cells, the periodic grid, the stepping engine and rendering
//!
//! # Example
//!
//! ```rust
//! use lattice_fluid::compute::Engine;
//!
//! let mut engine = Engine::new(&[50, 50], 0.02).unwrap();
//!
//! // Stir the fluid at the centre of the grid
//! engine.set_cell_velocity([25, 25], 0.1, 0.0);
//!
//! engine.run(100);
//!
//! println!("Total mass after 100 steps: {}", engine.mass());
//! let pixels = engine.render_buffer();
//! assert_eq!(pixels.len(), 4 * 50 * 50);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{Cell, Direction, Engine, Grid, SimulationStats};
pub use schema::{ConfigError, Pattern, Seed, SimulationConfig};
