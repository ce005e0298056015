//! Grayscale slices: pixel grids and the file I/O around them.
//!
//! This module provides:
//! - [`Grid`], a row-major single-channel pixel buffer generic over [`Sample`]
//! - [`Slice`], a decoded 8- or 16-bit slice
//! - [`read_slice`], [`write_slice`] and [`copy_slice`], the only code that
//!   touches slice files
//!
//! # Examples
//!
//! ```ignore
//! use stitchscan_core::slice::{read_slice, write_slice};
//!
//! let slice = read_slice(Path::new("slices/slice_0107.tif"))?;
//! println!("{}x{} slice", slice.width(), slice.height());
//! write_slice(Path::new("out/slice_0030.tif"), slice)?;
//! ```

mod io;
mod types;

pub use io::{copy_slice, read_slice, write_slice};
pub use types::{BitDepth, Grid, Sample, Slice};
