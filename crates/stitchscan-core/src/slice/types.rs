//! Core types for slice pixel data.

/// A grayscale sample type that slices can be stored in.
///
/// Arithmetic on samples happens in `f64`; converting back rounds to the
/// nearest integer and clamps to `0..=MAX`, so out-of-range values saturate
/// instead of wrapping.
pub trait Sample: Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// Largest representable value, as `f64`.
    const MAX: f64;

    fn to_f64(self) -> f64;

    fn from_f64_clamped(value: f64) -> Self;
}

impl Sample for u8 {
    const MAX: f64 = u8::MAX as f64;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64_clamped(value: f64) -> Self {
        // NaN maps to 0 through the saturating cast
        value.round().clamp(0.0, <Self as Sample>::MAX) as u8
    }
}

impl Sample for u16 {
    const MAX: f64 = u16::MAX as f64;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64_clamped(value: f64) -> Self {
        value.round().clamp(0.0, <Self as Sample>::MAX) as u16
    }
}

/// A single-channel pixel grid in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    /// Grid width in pixels.
    pub width: u32,
    /// Grid height in pixels.
    pub height: u32,
    /// Samples in row-major order; length is `width * height`.
    pub pixels: Vec<T>,
}

impl<T: Sample> Grid<T> {
    /// Create a new grid with the given dimensions and samples.
    pub fn new(width: u32, height: u32, pixels: Vec<T>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a grid filled with a single value.
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self::new(width, height, vec![value; width as usize * height as usize])
    }

    /// Sample at `(x, y)`; caller guarantees the coordinates are in bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> T {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = value;
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty grid.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// Bit depth of a slice as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

/// A decoded grayscale slice.
#[derive(Debug, Clone, PartialEq)]
pub enum Slice {
    Gray8(Grid<u8>),
    Gray16(Grid<u16>),
}

impl Slice {
    pub fn width(&self) -> u32 {
        match self {
            Slice::Gray8(g) => g.width,
            Slice::Gray16(g) => g.width,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Slice::Gray8(g) => g.height,
            Slice::Gray16(g) => g.height,
        }
    }

    pub fn bit_depth(&self) -> BitDepth {
        match self {
            Slice::Gray8(_) => BitDepth::Eight,
            Slice::Gray16(_) => BitDepth::Sixteen,
        }
    }
}

impl From<Grid<u8>> for Slice {
    fn from(grid: Grid<u8>) -> Self {
        Slice::Gray8(grid)
    }
}

impl From<Grid<u16>> for Slice {
    fn from(grid: Grid<u16>) -> Self {
        Slice::Gray16(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_clamping() {
        assert_eq!(u8::from_f64_clamped(-12.0), 0);
        assert_eq!(u8::from_f64_clamped(300.0), 255);
        assert_eq!(u8::from_f64_clamped(127.5), 128);
        assert_eq!(u8::from_f64_clamped(f64::NAN), 0);
    }

    #[test]
    fn test_u16_clamping() {
        assert_eq!(u16::from_f64_clamped(70_000.0), u16::MAX);
        assert_eq!(u16::from_f64_clamped(1234.4), 1234);
        assert_eq!(u16::from_f64_clamped(-0.4), 0);
    }

    #[test]
    fn test_sample_max_matches_integer_range() {
        assert_eq!(<u8 as Sample>::MAX, 255.0);
        assert_eq!(<u16 as Sample>::MAX, 65_535.0);
        assert_eq!(u8::from_f64_clamped(<u8 as Sample>::MAX), u8::MAX);
        assert_eq!(u16::from_f64_clamped(1e12), u16::MAX);
    }

    #[test]
    fn test_grid_get_set() {
        let mut g = Grid::filled(4, 3, 0u16);
        g.set(3, 2, 900);
        assert_eq!(g.get(3, 2), 900);
        assert_eq!(g.pixels[11], 900);
        assert_eq!(g.pixel_count(), 12);
        assert!(!g.is_empty());
    }

    #[test]
    fn test_slice_dimensions() {
        let slice = Slice::from(Grid::filled(7, 5, 1u8));
        assert_eq!(slice.width(), 7);
        assert_eq!(slice.height(), 5);
        assert_eq!(slice.bit_depth(), BitDepth::Eight);
    }

    #[test]
    fn test_empty_grid() {
        let g: Grid<u8> = Grid::new(0, 0, vec![]);
        assert!(g.is_empty());
    }
}
