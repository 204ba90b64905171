//! D2Q9 lattice node.
//!
//! Each cell carries nine discretized density components, one at rest and
//! eight moving towards the neighbouring cells:
//! ```text
//!   NW  N  NE
//!     \ | /
//!   W - C - E
//!     / | \
//!   SW  S  SE
//! ```
//! Macroscopic density and velocity are moments of these components.

use std::sync::OnceLock;

/// Number of discrete directions per cell.
pub const Q: usize = 9;

/// One of the nine D2Q9 lattice directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Direction {
    Rest = 0,
    North,
    South,
    East,
    West,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Direction {
    /// All directions in component order.
    pub const ALL: [Direction; Q] = [
        Direction::Rest,
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// Component index of this direction.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lattice velocity `(cx, cy)` with x pointing east and y pointing north.
    #[inline]
    pub const fn velocity(self) -> (i32, i32) {
        match self {
            Direction::Rest => (0, 0),
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
            Direction::NorthEast => (1, 1),
            Direction::SouthWest => (-1, -1),
            Direction::SouthEast => (1, -1),
        }
    }

    /// Grid offset `[dx, dy]` of the neighbour this direction points at.
    ///
    /// Rows grow southwards, so north is `y - 1`.
    #[inline]
    pub const fn offset(self) -> [isize; 2] {
        let (cx, cy) = self.velocity();
        [cx as isize, -(cy as isize)]
    }

    /// Equilibrium weight: 4/9 at rest, 1/9 on the axes, 1/36 on diagonals.
    #[inline]
    pub const fn weight(self) -> f64 {
        match self {
            Direction::Rest => 4.0 / 9.0,
            Direction::North | Direction::South | Direction::East | Direction::West => 1.0 / 9.0,
            _ => 1.0 / 36.0,
        }
    }

    /// Direction pointing the other way.
    #[inline]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Rest => Direction::Rest,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
            Direction::NorthEast => Direction::SouthWest,
            Direction::SouthWest => Direction::NorthEast,
            Direction::SouthEast => Direction::NorthWest,
        }
    }
}

/// Reciprocal relaxation time: OMEGA = 1 / (3 * viscosity + 0.5).
///
/// The BGK collision is only stable for OMEGA in (0, 2).
#[inline]
pub fn relaxation_factor(viscosity: f64) -> f64 {
    1.0 / (3.0 * viscosity + 0.5)
}

/// Compute the D2Q9 equilibrium distribution.
///
/// f_i = w_i * rho * (1 + 3 (e_i.u) + 9/2 (e_i.u)^2 - 3/2 (u.u))
#[inline]
pub fn equilibrium(ux: f64, uy: f64, rho: f64) -> [f64; Q] {
    let u_sq_15 = 1.5 * (ux * ux + uy * uy);
    Direction::ALL.map(|d| {
        let (cx, cy) = d.velocity();
        let eu = cx as f64 * ux + cy as f64 * uy;
        d.weight() * rho * (1.0 + 3.0 * eu + 4.5 * eu * eu - u_sq_15)
    })
}

/// A single lattice node.
///
/// Density is cached lazily. Every mutation goes through [`Cell::invalidate`]
/// or replaces the cache outright, so a stale value is never observed.
#[derive(Debug, Clone)]
pub struct Cell {
    f: [f64; Q],
    rho: OnceLock<f64>,
}

impl Default for Cell {
    fn default() -> Self {
        Self::at_rest()
    }
}

impl Cell {
    /// Create a cell at equilibrium with the given velocity and density.
    pub fn new(ux: f64, uy: f64, rho: f64) -> Self {
        Self {
            f: equilibrium(ux, uy, rho),
            rho: OnceLock::from(rho),
        }
    }

    /// Cell with unit density and zero velocity.
    pub fn at_rest() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// All nine components in [`Direction::ALL`] order.
    #[inline]
    pub fn components(&self) -> &[f64; Q] {
        &self.f
    }

    /// Component travelling in `direction`.
    #[inline]
    pub fn component(&self, direction: Direction) -> f64 {
        self.f[direction.index()]
    }

    /// Overwrite a single component.
    pub fn set_component(&mut self, direction: Direction, value: f64) {
        self.f[direction.index()] = value;
        self.invalidate();
    }

    /// Overwrite all components at once (used by streaming).
    #[inline]
    pub fn set_components(&mut self, f: [f64; Q]) {
        self.f = f;
        self.invalidate();
    }

    /// Drop the cached density; it is recomputed on next access.
    #[inline]
    pub fn invalidate(&mut self) {
        self.rho.take();
    }

    /// Macroscopic density (sum of all components).
    #[inline]
    pub fn density(&self) -> f64 {
        *self.rho.get_or_init(|| self.f.iter().sum())
    }

    /// Momentum density (rho * u).
    pub fn momentum(&self) -> (f64, f64) {
        let f = &self.f;
        let jx = f[Direction::East.index()] + f[Direction::NorthEast.index()]
            + f[Direction::SouthEast.index()]
            - f[Direction::West.index()]
            - f[Direction::NorthWest.index()]
            - f[Direction::SouthWest.index()];
        let jy = f[Direction::North.index()] + f[Direction::NorthEast.index()]
            + f[Direction::NorthWest.index()]
            - f[Direction::South.index()]
            - f[Direction::SouthEast.index()]
            - f[Direction::SouthWest.index()];
        (jx, jy)
    }

    /// Macroscopic velocity `(ux, uy)`.
    ///
    /// Density must stay positive: a cell with zero density yields
    /// non-finite components rather than a masked value.
    #[inline]
    pub fn velocity(&self) -> (f64, f64) {
        let rho = self.density();
        let (jx, jy) = self.momentum();
        (jx / rho, jy / rho)
    }

    /// Reset to the equilibrium distribution for the given macroscopic state.
    ///
    /// Any non-equilibrium part of the distribution is discarded.
    pub fn set_equilibrium(&mut self, ux: f64, uy: f64, rho: f64) {
        self.f = equilibrium(ux, uy, rho);
        self.rho = OnceLock::from(rho);
    }

    /// Set velocity, keeping the current density.
    pub fn set_velocity(&mut self, ux: f64, uy: f64) {
        let rho = self.density();
        self.set_equilibrium(ux, uy, rho);
    }

    /// Set density, keeping the current velocity.
    pub fn set_density(&mut self, rho: f64) {
        let (ux, uy) = self.velocity();
        self.set_equilibrium(ux, uy, rho);
    }

    /// BGK collision for the given viscosity.
    pub fn collide(&mut self, viscosity: f64) {
        self.relax(relaxation_factor(viscosity));
    }

    /// BGK collision with a precomputed relaxation factor.
    ///
    /// Each component moves `omega` of the way towards the equilibrium of
    /// the cell's own density and velocity. Mass is conserved.
    #[inline]
    pub fn relax(&mut self, omega: f64) {
        let rho = self.density();
        let (ux, uy) = self.velocity();
        let feq = equilibrium(ux, uy, rho);
        for (f, eq) in self.f.iter_mut().zip(feq) {
            *f += omega * (eq - *f);
        }
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const VISCOSITY: f64 = 0.02;

    fn perturbed() -> Cell {
        let mut cell = Cell::new(0.05, -0.02, 1.3);
        cell.set_component(Direction::NorthEast, cell.component(Direction::NorthEast) + 0.04);
        cell.set_component(Direction::West, cell.component(Direction::West) + 0.01);
        cell.set_component(Direction::Rest, cell.component(Direction::Rest) - 0.02);
        cell
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = Direction::ALL.iter().map(|d| d.weight()).sum();
        assert!((total - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_direction_tables() {
        for (i, d) in Direction::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
            assert_eq!(d.opposite().opposite(), *d);

            let (cx, cy) = d.velocity();
            let (ox, oy) = d.opposite().velocity();
            assert_eq!((cx + ox, cy + oy), (0, 0));
        }
        assert_eq!(Direction::North.offset(), [0, -1]);
        assert_eq!(Direction::SouthEast.offset(), [1, 1]);
    }

    #[test]
    fn test_rest_cell() {
        let cell = Cell::at_rest();
        assert!((cell.density() - 1.0).abs() < 1e-12);
        let (ux, uy) = cell.velocity();
        assert!(ux.abs() < 1e-15 && uy.abs() < 1e-15);
        assert!((cell.component(Direction::Rest) - 4.0 / 9.0).abs() < 1e-15);
        assert!((cell.component(Direction::East) - 1.0 / 9.0).abs() < 1e-15);
        assert!((cell.component(Direction::SouthWest) - 1.0 / 36.0).abs() < 1e-15);
    }

    #[test]
    fn test_equilibrium_is_fixed_point() {
        let mut cell = Cell::new(0.08, 0.03, 1.1);
        let before = *cell.components();

        cell.collide(VISCOSITY);

        for (a, b) in before.iter().zip(cell.components()) {
            assert!((a - b).abs() < 1e-14, "{} -> {}", a, b);
        }
    }

    #[test]
    fn test_collision_conserves_mass() {
        let mut cell = perturbed();
        let before = cell.density();

        cell.collide(VISCOSITY);

        assert!((cell.density() - before).abs() < 1e-12);
    }

    #[test]
    fn test_collision_conserves_momentum() {
        let mut cell = perturbed();
        let (jx, jy) = cell.momentum();

        cell.collide(VISCOSITY);

        let (jx2, jy2) = cell.momentum();
        assert!((jx - jx2).abs() < 1e-12);
        assert!((jy - jy2).abs() < 1e-12);
    }

    #[test]
    fn test_full_relaxation_reaches_equilibrium() {
        let mut cell = perturbed();
        let rho = cell.density();
        let (ux, uy) = cell.velocity();

        cell.relax(1.0);

        let expected = equilibrium(ux, uy, rho);
        for (a, b) in expected.iter().zip(cell.components()) {
            assert!((a - b).abs() < 1e-14);
        }
    }

    #[test]
    fn test_density_cache_invalidated_on_mutation() {
        let mut cell = Cell::at_rest();
        assert!((cell.density() - 1.0).abs() < 1e-12);

        cell.set_component(Direction::North, cell.component(Direction::North) + 0.5);
        assert!((cell.density() - 1.5).abs() < 1e-12);

        cell.set_components([0.0; Q]);
        assert_eq!(cell.density(), 0.0);
    }

    #[test]
    fn test_set_velocity_keeps_density() {
        let mut cell = Cell::new(0.0, 0.0, 2.5);
        cell.set_velocity(0.1, -0.05);

        let (ux, uy) = cell.velocity();
        assert!((cell.density() - 2.5).abs() < 1e-12);
        assert!((ux - 0.1).abs() < 1e-12);
        assert!((uy + 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_set_density_keeps_velocity() {
        let mut cell = Cell::new(-0.04, 0.07, 1.0);
        cell.set_density(5.0);

        let (ux, uy) = cell.velocity();
        assert!((cell.density() - 5.0).abs() < 1e-12);
        assert!((ux + 0.04).abs() < 1e-12);
        assert!((uy - 0.07).abs() < 1e-12);
    }

    #[test]
    fn test_set_equilibrium_discards_deviation() {
        let mut cell = perturbed();
        cell.set_equilibrium(0.0, 0.0, 1.0);

        let rest = Cell::at_rest();
        for (a, b) in rest.components().iter().zip(cell.components()) {
            assert!((a - b).abs() < 1e-15);
        }
    }

    #[test]
    fn test_zero_density_velocity_is_not_finite() {
        let mut cell = Cell::at_rest();
        cell.set_components([0.0; Q]);

        let (ux, uy) = cell.velocity();
        assert!(!ux.is_finite());
        assert!(!uy.is_finite());
    }

    proptest! {
        #[test]
        fn prop_equilibrium_round_trip(
            ux in -0.2f64..0.2,
            uy in -0.2f64..0.2,
            rho in 0.05f64..20.0,
        ) {
            let mut cell = Cell::at_rest();
            cell.set_equilibrium(ux, uy, rho);
            // force recomputation from the components
            cell.invalidate();

            let (vx, vy) = cell.velocity();
            prop_assert!((cell.density() - rho).abs() < 1e-12 * rho.max(1.0));
            prop_assert!((vx - ux).abs() < 1e-12);
            prop_assert!((vy - uy).abs() < 1e-12);
        }

        #[test]
        fn prop_collision_conserves_mass(
            ux in -0.15f64..0.15,
            uy in -0.15f64..0.15,
            rho in 0.5f64..3.0,
            bump in 0.0f64..0.05,
            viscosity in 0.005f64..1.0,
        ) {
            let mut cell = Cell::new(ux, uy, rho);
            cell.set_component(Direction::SouthWest, cell.component(Direction::SouthWest) + bump);
            let before = cell.density();

            cell.collide(viscosity);

            prop_assert!((cell.density() - before).abs() < 1e-12 * before);
        }
    }
}
