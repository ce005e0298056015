//! Geometric transforms applied to every slice of a stack.
//!
//! # Coordinate System
//!
//! - `(x, y)` = `(column, row)`, origin at the top-left pixel center
//! - Positive `dx` moves content right, positive `dy` moves content down
//! - Rotation angles are in degrees, positive = counter-clockwise as
//!   displayed, about the center of the pixel grid
//!
//! # Resampling
//!
//! Output slices keep the input dimensions. Values come from bilinear
//! interpolation of the source; positions outside it use a [`FillPolicy`]
//! (zero by default).

mod rigid;
mod warp;

pub use rigid::{AffineMatrix, RigidTransform2D};
pub use warp::{warp, FillPolicy};
