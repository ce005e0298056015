//! Resampling a slice through an affine transform with bilinear interpolation.
//!
//! # Algorithm
//!
//! The warp uses inverse mapping: for each pixel of the output slice, the
//! inverse matrix gives the source position it comes from, and the value is
//! interpolated from the 4 surrounding source pixels:
//!
//! ```text
//! (src_x, src_y) = inverse * (dst_x, dst_y)
//! v = p00 (1-fx)(1-fy) + p10 fx (1-fy) + p01 (1-fx) fy + p11 fx fy
//! ```
//!
//! The output has the same dimensions as the input; nothing is expanded or
//! cropped, so every slice of a stack stays the same size. Neighbors that
//! fall outside the source are taken from the [`FillPolicy`]. At integer
//! source positions the interpolation weights are exactly 0 and 1, so whole
//! pixel translations copy samples without any rounding error.

use serde::{Deserialize, Serialize};

use super::AffineMatrix;
use crate::slice::{Grid, Sample};

/// How samples outside the source slice are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Out-of-bounds samples are 0.
    #[default]
    Zero,
    /// Out-of-bounds samples repeat the nearest border pixel.
    Edge,
}

/// Warp `grid` through the forward transform whose inverse is `inverse`,
/// multiplying every interpolated value by `gain`.
///
/// Gain is folded into the same pass so each output sample is rounded and
/// clamped exactly once.
pub fn warp<T: Sample>(grid: &Grid<T>, inverse: &AffineMatrix, fill: FillPolicy, gain: f64) -> Grid<T> {
    if grid.is_empty() {
        return grid.clone();
    }

    let mut pixels = Vec::with_capacity(grid.pixel_count());

    for dst_y in 0..grid.height {
        for dst_x in 0..grid.width {
            let (src_x, src_y) = inverse.apply(dst_x as f64, dst_y as f64);
            let value = sample_bilinear(grid, src_x, src_y, fill);
            pixels.push(T::from_f64_clamped(value * gain));
        }
    }

    Grid::new(grid.width, grid.height, pixels)
}

/// Fetch a pixel as `f64`, applying the fill policy out of bounds.
#[inline]
fn get_pixel_f64<T: Sample>(grid: &Grid<T>, px: i64, py: i64, fill: FillPolicy) -> f64 {
    let (w, h) = (grid.width as i64, grid.height as i64);
    if px >= 0 && px < w && py >= 0 && py < h {
        return grid.get(px as u32, py as u32).to_f64();
    }
    match fill {
        FillPolicy::Zero => 0.0,
        FillPolicy::Edge => grid
            .get(px.clamp(0, w - 1) as u32, py.clamp(0, h - 1) as u32)
            .to_f64(),
    }
}

/// Sample a position using bilinear interpolation.
fn sample_bilinear<T: Sample>(grid: &Grid<T>, x: f64, y: f64, fill: FillPolicy) -> f64 {
    let (w, h) = (grid.width as f64, grid.height as f64);

    // Entirely outside: no neighbor can contribute a source value
    if fill == FillPolicy::Zero && (x <= -1.0 || x >= w || y <= -1.0 || y >= h) {
        return 0.0;
    }

    // Past one pixel outside, every neighbor resolves to the border
    let x = x.clamp(-1.0, w);
    let y = y.clamp(-1.0, h);

    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;
    let (x0, y0) = (x0f as i64, y0f as i64);

    let p00 = get_pixel_f64(grid, x0, y0, fill);
    let p10 = get_pixel_f64(grid, x0 + 1, y0, fill);
    let p01 = get_pixel_f64(grid, x0, y0 + 1, fill);
    let p11 = get_pixel_f64(grid, x0 + 1, y0 + 1, fill);

    p00 * (1.0 - fx) * (1.0 - fy) + p10 * fx * (1.0 - fy) + p01 * (1.0 - fx) * fy + p11 * fx * fy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::RigidTransform2D;

    /// Create a test grid where each pixel has a unique value based on position.
    fn test_grid(width: u32, height: u32) -> Grid<u16> {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (y * 100 + x + 1) as u16))
            .collect();
        Grid::new(width, height, pixels)
    }

    fn inverse_of(t: RigidTransform2D, grid: &Grid<u16>) -> AffineMatrix {
        t.forward_matrix(grid.width, grid.height).inverse().unwrap()
    }

    #[test]
    fn test_identity_warp_is_exact() {
        let g = test_grid(9, 6);
        let out = warp(&g, &AffineMatrix::IDENTITY, FillPolicy::Zero, 1.0);
        assert_eq!(out, g);
    }

    #[test]
    fn test_translate_up_zero_fill() {
        // Content moves 4 rows up; the 4 exposed bottom rows are zero
        let g = test_grid(5, 8);
        let inv = inverse_of(RigidTransform2D::Translate { dx: 0.0, dy: -4.0 }, &g);
        let out = warp(&g, &inv, FillPolicy::Zero, 1.0);

        for y in 0..8 {
            for x in 0..5 {
                let expected = if y < 4 { g.get(x, y + 4) } else { 0 };
                assert_eq!(out.get(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_translate_up_edge_fill() {
        let g = test_grid(5, 8);
        let inv = inverse_of(RigidTransform2D::Translate { dx: 0.0, dy: -4.0 }, &g);
        let out = warp(&g, &inv, FillPolicy::Edge, 1.0);

        for y in 4..8 {
            for x in 0..5 {
                assert_eq!(out.get(x, y), g.get(x, 7));
            }
        }
    }

    #[test]
    fn test_translate_right() {
        let g = test_grid(6, 3);
        let inv = inverse_of(RigidTransform2D::Translate { dx: 2.0, dy: 0.0 }, &g);
        let out = warp(&g, &inv, FillPolicy::Zero, 1.0);

        assert_eq!(out.get(0, 1), 0);
        assert_eq!(out.get(1, 1), 0);
        assert_eq!(out.get(2, 1), g.get(0, 1));
        assert_eq!(out.get(5, 2), g.get(3, 2));
    }

    #[test]
    fn test_half_pixel_translation_interpolates() {
        let g = Grid::new(4, 1, vec![0u8, 100, 200, 250]);
        let inv = AffineMatrix::translation(0.5, 0.0).inverse().unwrap();
        let out = warp(&g, &inv, FillPolicy::Edge, 1.0);

        // out(x) = in(x - 0.5)
        assert_eq!(out.pixels, vec![0, 50, 150, 225]);
    }

    #[test]
    fn test_quarter_turn_of_square() {
        let mut g = Grid::filled(5, 5, 0u16);
        g.set(4, 2, 1000);
        let inv = inverse_of(
            RigidTransform2D::Rotate {
                angle_degrees: 90.0,
                dx: 0.0,
                dy: 0.0,
            },
            &g,
        );
        let out = warp(&g, &inv, FillPolicy::Zero, 1.0);

        assert_eq!(out.get(2, 0), 1000);
        assert_eq!(out.pixels.iter().filter(|&&v| v != 0).count(), 1);
    }

    #[test]
    fn test_half_turn_reverses_pixels() {
        let g = test_grid(4, 3);
        let inv = inverse_of(
            RigidTransform2D::Rotate {
                angle_degrees: 180.0,
                dx: 0.0,
                dy: 0.0,
            },
            &g,
        );
        let out = warp(&g, &inv, FillPolicy::Zero, 1.0);

        let mut reversed = g.pixels.clone();
        reversed.reverse();
        assert_eq!(out.pixels, reversed);
    }

    #[test]
    fn test_gain_applied_during_warp() {
        let g = Grid::new(3, 1, vec![10u8, 100, 200]);
        let inv = AffineMatrix::translation(1.0, 0.0).inverse().unwrap();
        let out = warp(&g, &inv, FillPolicy::Zero, 2.0);
        assert_eq!(out.pixels, vec![0, 20, 200]);
    }

    #[test]
    fn test_translation_out_of_frame_is_all_fill() {
        let g = test_grid(4, 4);
        let inv = AffineMatrix::translation(10.0, 0.0).inverse().unwrap();
        let out = warp(&g, &inv, FillPolicy::Zero, 1.0);
        assert!(out.pixels.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_edge_fill_far_outside_repeats_border() {
        let g = test_grid(3, 3);
        let left = AffineMatrix::translation(-1e300, 0.0).inverse().unwrap();
        let out = warp(&g, &left, FillPolicy::Edge, 1.0);
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(out.get(x, y), g.get(2, y));
            }
        }

        let down = AffineMatrix::translation(0.0, 1e300).inverse().unwrap();
        let out = warp(&g, &down, FillPolicy::Edge, 1.0);
        for x in 0..3 {
            assert_eq!(out.get(x, 2), g.get(x, 0));
        }
    }

    #[test]
    fn test_single_pixel_grid() {
        let g = Grid::new(1, 1, vec![42u8]);
        let inv = single_pixel_inverse(RigidTransform2D::Rotate {
            angle_degrees: 33.0,
            dx: 0.0,
            dy: 0.0,
        });
        assert_eq!(warp(&g, &inv, FillPolicy::Edge, 1.0).pixels, vec![42]);
    }

    #[test]
    fn test_empty_grid_untouched() {
        let g: Grid<u8> = Grid::new(0, 0, vec![]);
        let out = warp(&g, &AffineMatrix::translation(1.0, 1.0), FillPolicy::Edge, 1.0);
        assert!(out.is_empty());
    }

    fn single_pixel_inverse(t: RigidTransform2D) -> AffineMatrix {
        t.forward_matrix(1, 1).inverse().unwrap()
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
