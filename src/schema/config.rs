//! Configuration types for lattice Boltzmann simulation parameters.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compute::relaxation_factor;

fn default_sweeps() -> u32 {
    1
}

fn default_fps() -> u32 {
    60
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Lattice width in cells (first axis).
    pub width: usize,
    /// Lattice height in cells (second axis).
    pub height: usize,
    /// Kinematic viscosity in lattice units.
    pub viscosity: f64,
    /// Simulation steps per rendered frame.
    #[serde(default = "default_sweeps")]
    pub sweeps: u32,
    /// Desired frames per second for a real-time front end.
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            viscosity: 0.02,
            sweeps: 1,
            fps: 60,
        }
    }
}

impl SimulationConfig {
    /// Grid extents `[width, height]`.
    #[inline]
    pub fn extents(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    /// Total number of cells.
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.width * self.height
    }

    /// Relaxation factor derived from the viscosity.
    #[inline]
    pub fn omega(&self) -> f64 {
        relaxation_factor(self.viscosity)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroExtent { axis: 0 });
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroExtent { axis: 1 });
        }
        check_viscosity(self.viscosity)?;
        if self.sweeps == 0 {
            return Err(ConfigError::InvalidSweeps);
        }
        Ok(())
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Check that a viscosity gives a stable relaxation factor, returning it.
pub fn check_viscosity(viscosity: f64) -> Result<f64, ConfigError> {
    let omega = relaxation_factor(viscosity);
    if omega.is_finite() && omega > 0.0 && omega < 2.0 {
        Ok(omega)
    } else {
        Err(ConfigError::UnstableViscosity { viscosity, omega })
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid must have at least one axis")]
    EmptyExtents,
    #[error("Grid extent on axis {axis} must be non-zero")]
    ZeroExtent { axis: usize },
    #[error("Grid cell count overflows usize")]
    TooManyCells,
    #[error("Expected a {expected}-dimensional grid, got {actual} dimensions")]
    UnsupportedDimensionality { expected: usize, actual: usize },
    #[error("Viscosity {viscosity} gives relaxation factor {omega}, outside (0, 2)")]
    UnstableViscosity { viscosity: f64, omega: f64 },
    #[error("Sweeps per frame must be non-zero")]
    InvalidSweeps,
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
