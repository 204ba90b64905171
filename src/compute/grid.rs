//! Periodic n-dimensional grid container.
//!
//! Data is stored as a flat array in row-major order (first axis outermost).
//! Every coordinate is reduced modulo its axis extent, so the domain is a
//! torus with no edge cells.

use crate::schema::ConfigError;

/// Check that the extents describe a non-empty grid and return its cell count.
pub fn validate_extents(extents: &[usize]) -> Result<usize, ConfigError> {
    if extents.is_empty() {
        return Err(ConfigError::EmptyExtents);
    }
    if let Some(axis) = extents.iter().position(|&e| e == 0) {
        return Err(ConfigError::ZeroExtent { axis });
    }
    extents
        .iter()
        .try_fold(1usize, |n, &e| n.checked_mul(e))
        .ok_or(ConfigError::TooManyCells)
}

/// Periodic grid of `T` over declared per-axis extents.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    extents: Vec<usize>,
    strides: Vec<usize>,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell a clone of `value`.
    pub fn filled(extents: &[usize], value: T) -> Result<Self, ConfigError> {
        let len = validate_extents(extents)?;
        Ok(Self::from_cells(extents, vec![value; len]))
    }
}

impl<T> Grid<T> {
    /// Create a grid, calling `factory` once per cell so each cell is distinct.
    pub fn from_fn(extents: &[usize], mut factory: impl FnMut() -> T) -> Result<Self, ConfigError> {
        let len = validate_extents(extents)?;
        Ok(Self::from_cells(extents, (0..len).map(|_| factory()).collect()))
    }

    fn from_cells(extents: &[usize], cells: Vec<T>) -> Self {
        let mut strides = vec![1usize; extents.len()];
        for axis in (0..extents.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * extents[axis + 1];
        }

        Self {
            extents: extents.to_vec(),
            strides,
            cells,
        }
    }

    /// Per-axis extents.
    #[inline]
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Number of axes.
    #[inline]
    pub fn dimensionality(&self) -> usize {
        self.extents.len()
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed grid; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Linear offset of `coords`, each axis wrapped around its extent.
    ///
    /// # Panics
    /// If `coords` does not have one entry per axis.
    #[inline]
    pub fn offset(&self, coords: &[isize]) -> usize {
        assert_eq!(
            coords.len(),
            self.extents.len(),
            "expected {} coordinates, got {}",
            self.extents.len(),
            coords.len()
        );
        coords
            .iter()
            .zip(&self.extents)
            .zip(&self.strides)
            .map(|((&c, &extent), &stride)| c.rem_euclid(extent as isize) as usize * stride)
            .sum()
    }

    /// Coordinates of the cell at linear `offset`.
    pub fn coords_of(&self, offset: usize) -> Vec<usize> {
        self.extents
            .iter()
            .zip(&self.strides)
            .map(|(&extent, &stride)| (offset / stride) % extent)
            .collect()
    }

    /// All coordinates in linear order.
    pub fn coords(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        (0..self.len()).map(|offset| self.coords_of(offset))
    }

    /// Cell at `coords` (wrapped).
    #[inline]
    pub fn at(&self, coords: &[isize]) -> &T {
        &self.cells[self.offset(coords)]
    }

    /// Mutable cell at `coords` (wrapped).
    #[inline]
    pub fn at_mut(&mut self, coords: &[isize]) -> &mut T {
        let offset = self.offset(coords);
        &mut self.cells[offset]
    }

    /// Iterate cells in linear order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.cells.iter()
    }

    /// Iterate cells mutably in linear order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.cells.iter_mut()
    }

    /// Flat view of the cells.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// Mutable flat view of the cells.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Fold every cell through `extract`, combining results with `combine`.
    pub fn reduce<V, A>(
        &self,
        init: A,
        mut extract: impl FnMut(&T) -> V,
        mut combine: impl FnMut(A, V) -> A,
    ) -> A {
        self.cells
            .iter()
            .fold(init, |acc, cell| combine(acc, extract(cell)))
    }

    /// Sum of `extract` over every cell.
    pub fn sum(&self, extract: impl FnMut(&T) -> f64) -> f64 {
        self.reduce(0.0, extract, |acc, v| acc + v)
    }

    /// Mean of `extract` over every cell.
    pub fn average(&self, extract: impl FnMut(&T) -> f64) -> f64 {
        self.sum(extract) / self.len() as f64
    }
}

impl<'a, T> IntoIterator for &'a Grid<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Grid<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_extents() {
        assert!(matches!(
            Grid::filled(&[], 0u8),
            Err(ConfigError::EmptyExtents)
        ));
        assert!(matches!(
            Grid::filled(&[4, 0, 2], 0u8),
            Err(ConfigError::ZeroExtent { axis: 1 })
        ));
        assert!(matches!(
            Grid::filled(&[usize::MAX, 2], 0u8),
            Err(ConfigError::TooManyCells)
        ));
    }

    #[test]
    fn test_row_major_layout() {
        let mut counter = 0;
        let grid = Grid::from_fn(&[2, 3], || {
            counter += 1;
            counter
        })
        .unwrap();

        assert_eq!(grid.len(), 6);
        assert_eq!(grid.dimensionality(), 2);
        assert_eq!(*grid.at(&[0, 0]), 1);
        assert_eq!(*grid.at(&[0, 2]), 3);
        assert_eq!(*grid.at(&[1, 0]), 4);
        assert_eq!(grid.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_factory_called_once_per_cell() {
        let mut calls = 0;
        let grid = Grid::from_fn(&[3, 4, 5], || {
            calls += 1;
            vec![0u8]
        })
        .unwrap();
        assert_eq!(calls, 60);
        assert_eq!(grid.len(), 60);
    }

    #[test]
    fn test_wraparound() {
        let grid = Grid::from_fn(&[3, 4], {
            let mut i = 0;
            move || {
                i += 1;
                i
            }
        })
        .unwrap();

        assert_eq!(grid.at(&[-1, 0]), grid.at(&[2, 0]));
        assert_eq!(grid.at(&[0, -1]), grid.at(&[0, 3]));
        assert_eq!(grid.at(&[3, 4]), grid.at(&[0, 0]));
        assert_eq!(grid.at(&[-4, -9]), grid.at(&[2, 3]));
    }

    #[test]
    fn test_coords_round_trip_offset() {
        let grid = Grid::filled(&[4, 5, 2], ()).unwrap();
        for (offset, coords) in grid.coords().enumerate() {
            let signed: Vec<isize> = coords.iter().map(|&c| c as isize).collect();
            assert_eq!(grid.offset(&signed), offset);
        }
    }

    #[test]
    fn test_at_mut_writes_through() {
        let mut grid = Grid::filled(&[3, 3], 0).unwrap();
        *grid.at_mut(&[-1, 4]) = 7;
        assert_eq!(*grid.at(&[2, 1]), 7);
        assert_eq!(grid.iter().filter(|&&v| v == 7).count(), 1);
    }

    #[test]
    fn test_reductions() {
        let grid = Grid::from_fn(&[2, 2], {
            let mut i = 0.0;
            move || {
                i += 1.0;
                i
            }
        })
        .unwrap();

        assert_eq!(grid.sum(|&v| v), 10.0);
        assert_eq!(grid.average(|&v| v), 2.5);
        let max = grid.reduce(f64::NEG_INFINITY, |&v| v, f64::max);
        assert_eq!(max, 4.0);
    }

    #[test]
    #[should_panic(expected = "expected 2 coordinates")]
    fn test_wrong_arity_panics() {
        let grid = Grid::filled(&[2, 2], 0).unwrap();
        grid.at(&[1]);
    }
}
