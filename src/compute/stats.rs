//! Aggregate diagnostics for monitoring a running simulation.

use super::{Cell, Engine};

/// Simulation statistics for monitoring.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SimulationStats {
    pub step: u64,
    /// Total mass (conserved without external disturbance).
    pub total_mass: f64,
    pub average_velocity: (f64, f64),
    pub min_density: f64,
    pub max_density: f64,
    /// Largest velocity magnitude of any cell.
    pub max_speed: f64,
}

impl SimulationStats {
    /// Compute statistics from the engine's current grid.
    pub fn from_engine(engine: &Engine) -> Self {
        Self::from_cells(engine.grid().as_slice(), engine.step_count())
    }

    /// Compute statistics from a flat slice of cells.
    pub fn from_cells(cells: &[Cell], step: u64) -> Self {
        let mut total_mass = 0.0;
        let mut sum_ux = 0.0;
        let mut sum_uy = 0.0;
        let mut min_density = f64::INFINITY;
        let mut max_density = f64::NEG_INFINITY;
        let mut max_speed = 0.0f64;

        for cell in cells {
            let rho = cell.density();
            let (ux, uy) = cell.velocity();

            total_mass += rho;
            sum_ux += ux;
            sum_uy += uy;
            min_density = min_density.min(rho);
            max_density = max_density.max(rho);
            max_speed = max_speed.max((ux * ux + uy * uy).sqrt());
        }

        let n = cells.len() as f64;
        Self {
            step,
            total_mass,
            average_velocity: (sum_ux / n, sum_uy / n),
            min_density,
            max_density,
            max_speed,
        }
    }

    /// False once the state has blown up (NaN or infinite moments).
    pub fn is_finite(&self) -> bool {
        self.total_mass.is_finite()
            && self.average_velocity.0.is_finite()
            && self.average_velocity.1.is_finite()
            && self.min_density.is_finite()
            && self.max_density.is_finite()
            && self.max_speed.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Q;

    #[test]
    fn test_stats_at_rest() {
        let engine = Engine::new(&[4, 4], 0.02).unwrap();
        let stats = engine.stats();

        assert_eq!(stats.step, 0);
        assert!((stats.total_mass - 16.0).abs() < 1e-12);
        assert!((stats.min_density - 1.0).abs() < 1e-12);
        assert!((stats.max_density - 1.0).abs() < 1e-12);
        assert!(stats.max_speed < 1e-12);
        assert!(stats.is_finite());
    }

    #[test]
    fn test_stats_agree_with_engine_diagnostics() {
        let mut engine = Engine::new(&[7, 5], 0.05).unwrap();
        engine.set_cell_velocity([2, 2], 0.1, 0.02);
        engine.set_cell_density([4, 1], 1.4);
        engine.run(10);

        let stats = engine.stats();
        let (ux, uy) = engine.average_velocity();
        assert!((stats.total_mass - engine.mass()).abs() < 1e-12);
        assert!((stats.average_velocity.0 - ux).abs() < 1e-15);
        assert!((stats.average_velocity.1 - uy).abs() < 1e-15);
        assert!(stats.max_density > stats.min_density);
        assert!(stats.max_speed > 0.0);
    }

    #[test]
    fn test_stats_detect_empty_cell() {
        let mut engine = Engine::new(&[3, 3], 0.02).unwrap();
        engine.cell_mut([0, 0]).set_components([0.0; Q]);

        let stats = engine.stats();
        assert!(!stats.is_finite());
        assert_eq!(stats.min_density, 0.0);
    }
}
