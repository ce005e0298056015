//! Stitchscan Core - slice renumbering for tomographic stitch scans
//!
//! A stitch scan is a set of vertically displaced scans of one sample. To
//! merge their reconstructions into one continuous stack, a range of slices
//! from each scan is copied under new slice numbers, optionally aligned with
//! a rigid 2D transform and corrected with a grey-value gain.
//!
//! # Module Structure
//!
//! - `template` - slice filename templates (`slice_0107.tif` -> any index)
//! - `range` - input slice ranges and the input-to-output index mapping
//! - `slice` - grayscale pixel grids and slice file I/O
//! - `transform` - rigid/affine transforms and bilinear warping
//! - `gain` - grey-value gain with saturation
//! - `transformer` - the validated job that ties everything together
//!
//! # Usage
//!
//! ```ignore
//! use stitchscan_core::{process, RigidTransform2D, SliceRange, StitchConfig};
//!
//! let mut config = StitchConfig::new(
//!     "recons/scan_Z0/slices/slice_0000.tif",
//!     "recons/merged/slice_0000.tif",
//!     SliceRange::new(107, 112)?,
//!     30,
//! );
//! config.transform = RigidTransform2D::Translate { dx: 0.0, dy: -4.0 };
//! let written = process(config)?;
//! assert_eq!(written, 6);
//! ```

pub mod error;
pub mod gain;
pub mod range;
pub mod slice;
pub mod template;
pub mod transform;
pub mod transformer;

pub use error::StitchError;
pub use range::{OutputMapping, SliceRange};
pub use slice::{Grid, Slice};
pub use template::SliceTemplate;
pub use transform::{AffineMatrix, FillPolicy, RigidTransform2D};
pub use transformer::{process, SliceTransformer, SliceWritten, StitchConfig};
