//! Grayscale RGBA rendering of the density field.
//!
//! Each cell becomes one pixel: R = G = B = clamp(round(density * 255) - 200, 0, 255)
//! and A = 255. Visualization front ends depend on this exact mapping.

use super::Cell;

/// Bytes per rendered cell.
pub const BYTES_PER_PIXEL: usize = 4;

/// Render errors.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Render buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Gray level for a density value.
///
/// Non-finite densities map to black.
#[inline]
pub fn shade(density: f64) -> u8 {
    let value = ((density * 255.0).round() - 200.0).clamp(0.0, 255.0);
    if value.is_nan() { 0 } else { value as u8 }
}

/// Render `cells` into `out`, which must hold exactly 4 bytes per cell.
pub fn render_density_into(cells: &[Cell], out: &mut [u8]) -> Result<(), RenderError> {
    let expected = cells.len() * BYTES_PER_PIXEL;
    if out.len() != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: out.len(),
        });
    }

    fill_pixels(cells, out);
    Ok(())
}

/// Render `cells` into a freshly allocated buffer.
pub fn render_density(cells: &[Cell]) -> Vec<u8> {
    let mut out = vec![0u8; cells.len() * BYTES_PER_PIXEL];
    fill_pixels(cells, &mut out);
    out
}

fn fill_pixels(cells: &[Cell], out: &mut [u8]) {
    for (pixel, cell) in out.chunks_exact_mut(BYTES_PER_PIXEL).zip(cells) {
        let v = shade(cell.density());
        pixel.copy_from_slice(&[v, v, v, 255]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shade_mapping() {
        assert_eq!(shade(1.0), 55);
        assert_eq!(shade(0.5), 0);
        assert_eq!(shade(0.0), 0);
        assert_eq!(shade(-3.0), 0);
        assert_eq!(shade(1.5), 183);
        assert_eq!(shade(10.0), 255);
        assert_eq!(shade(f64::NAN), 0);
        assert_eq!(shade(f64::INFINITY), 255);
    }

    #[test]
    fn test_shade_rounds() {
        // 1.002 * 255 = 255.51 -> 256 -> 56
        assert_eq!(shade(1.002), 56);
        // 0.9999 * 255 = 254.97 -> 255 -> 55
        assert_eq!(shade(0.9999), 55);
    }

    #[test]
    fn test_rest_cells_render_gray() {
        let cells = vec![Cell::at_rest(); 6];
        let buffer = render_density(&cells);

        assert_eq!(buffer.len(), 24);
        for pixel in buffer.chunks_exact(4) {
            assert_eq!(pixel, &[55, 55, 55, 255]);
        }
    }

    #[test]
    fn test_render_into_checks_length() {
        let cells = vec![Cell::at_rest(); 3];
        let mut short = vec![0u8; 11];
        assert!(matches!(
            render_density_into(&cells, &mut short),
            Err(RenderError::BufferSize {
                expected: 12,
                actual: 11
            })
        ));

        let mut exact = vec![0u8; 12];
        render_density_into(&cells, &mut exact).unwrap();
        assert_eq!(exact, render_density(&cells));
    }
}
