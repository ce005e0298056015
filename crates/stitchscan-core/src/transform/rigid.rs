//! Rigid and affine 2D transforms in pixel coordinates.
//!
//! Coordinates are `(x, y)` = `(column, row)` with `y` growing downward.
//! A forward transform maps a source pixel position to where its content
//! ends up in the output:
//!
//! ```text
//! x' = a11 * x + a12 * y + atx
//! y' = a21 * x + a22 * y + aty
//! ```
//!
//! Resampling uses the inverse of that matrix (see `warp`).

use serde::{Deserialize, Serialize};

use crate::error::StitchError;

const IDENTITY_TOLERANCE: f64 = 1e-12;

/// A 2x3 affine matrix, row-major, in the `[[a11, a12, atx], [a21, a22, aty]]`
/// layout used by common imaging toolkits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMatrix {
    pub a11: f64,
    pub a12: f64,
    pub atx: f64,
    pub a21: f64,
    pub a22: f64,
    pub aty: f64,
}

impl AffineMatrix {
    pub const IDENTITY: Self = Self {
        a11: 1.0,
        a12: 0.0,
        atx: 0.0,
        a21: 0.0,
        a22: 1.0,
        aty: 0.0,
    };

    /// Build from the six components in `a11 a12 atx a21 a22 aty` order.
    pub fn from_components(c: [f64; 6]) -> Self {
        Self {
            a11: c[0],
            a12: c[1],
            atx: c[2],
            a21: c[3],
            a22: c[4],
            aty: c[5],
        }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            atx: dx,
            aty: dy,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `angle_degrees` about `(cx, cy)`.
    ///
    /// Positive angles turn the image counter-clockwise as displayed, which
    /// with a downward `y` axis is `[[cos, sin], [-sin, cos]]`.
    pub fn rotation_about(angle_degrees: f64, cx: f64, cy: f64) -> Self {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        Self {
            a11: cos,
            a12: sin,
            atx: cx - cos * cx - sin * cy,
            a21: -sin,
            a22: cos,
            aty: cy + sin * cx - cos * cy,
        }
    }

    /// The transform that applies `self` first and then `next`.
    pub fn then(&self, next: &Self) -> Self {
        Self {
            a11: next.a11 * self.a11 + next.a12 * self.a21,
            a12: next.a11 * self.a12 + next.a12 * self.a22,
            atx: next.a11 * self.atx + next.a12 * self.aty + next.atx,
            a21: next.a21 * self.a11 + next.a22 * self.a21,
            a22: next.a21 * self.a12 + next.a22 * self.a22,
            aty: next.a21 * self.atx + next.a22 * self.aty + next.aty,
        }
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a11 * x + self.a12 * y + self.atx,
            self.a21 * x + self.a22 * y + self.aty,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a11 * self.a22 - self.a12 * self.a21
    }

    /// Inverse matrix, or `None` if the linear part is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < f64::EPSILON {
            return None;
        }
        let a11 = self.a22 / det;
        let a12 = -self.a12 / det;
        let a21 = -self.a21 / det;
        let a22 = self.a11 / det;
        Some(Self {
            a11,
            a12,
            atx: -(a11 * self.atx + a12 * self.aty),
            a21,
            a22,
            aty: -(a21 * self.atx + a22 * self.aty),
        })
    }

    pub fn is_finite(&self) -> bool {
        self.components().iter().all(|c| c.is_finite())
    }

    pub fn is_identity(&self) -> bool {
        self.components()
            .iter()
            .zip(Self::IDENTITY.components())
            .all(|(a, b)| (a - b).abs() < IDENTITY_TOLERANCE)
    }

    pub fn components(&self) -> [f64; 6] {
        [self.a11, self.a12, self.atx, self.a21, self.a22, self.aty]
    }
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The transform applied uniformly to every slice of a job.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RigidTransform2D {
    #[default]
    Identity,
    /// Shift by `(dx, dy)` pixels.
    Translate { dx: f64, dy: f64 },
    /// Rotate about the image center, then shift by `(dx, dy)`.
    Rotate { angle_degrees: f64, dx: f64, dy: f64 },
    /// Arbitrary forward affine matrix.
    Matrix(AffineMatrix),
}

impl RigidTransform2D {
    /// Check that every component is finite and the matrix is invertible.
    pub fn validate(&self) -> Result<(), StitchError> {
        // Any non-degenerate size works for the check; the center only
        // shifts the translation part.
        let matrix = self.forward_matrix(2, 2);
        if !matrix.is_finite() {
            return Err(StitchError::invalid(format!(
                "transform has non-finite components: {self:?}"
            )));
        }
        if matrix.inverse().is_none() {
            return Err(StitchError::invalid(format!(
                "transform matrix is not invertible (determinant {})",
                matrix.determinant()
            )));
        }
        Ok(())
    }

    /// True if the transform leaves every pixel where it is.
    pub fn is_identity(&self) -> bool {
        self.forward_matrix(2, 2).is_identity()
    }

    /// Forward matrix for a `width` x `height` slice.
    ///
    /// The rotation center is the middle of the pixel grid,
    /// `((width - 1) / 2, (height - 1) / 2)`, so a quarter turn maps the
    /// pixel lattice of a square slice onto itself.
    pub fn forward_matrix(&self, width: u32, height: u32) -> AffineMatrix {
        match *self {
            RigidTransform2D::Identity => AffineMatrix::IDENTITY,
            RigidTransform2D::Translate { dx, dy } => AffineMatrix::translation(dx, dy),
            RigidTransform2D::Rotate {
                angle_degrees,
                dx,
                dy,
            } => {
                let cx = (width.max(1) - 1) as f64 / 2.0;
                let cy = (height.max(1) - 1) as f64 / 2.0;
                AffineMatrix::rotation_about(angle_degrees, cx, cy)
                    .then(&AffineMatrix::translation(dx, dy))
            }
            RigidTransform2D::Matrix(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-9 && (actual.1 - expected.1).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_translation_moves_points() {
        let m = AffineMatrix::translation(3.0, -4.0);
        assert_close(m.apply(1.0, 1.0), (4.0, -3.0));
    }

    #[test]
    fn test_quarter_turn_moves_right_of_center_to_above() {
        let m = AffineMatrix::rotation_about(90.0, 2.0, 2.0);
        assert_close(m.apply(4.0, 2.0), (2.0, 0.0));
        assert_close(m.apply(2.0, 2.0), (2.0, 2.0));
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = AffineMatrix::rotation_about(17.0, 10.0, 5.0).then(&AffineMatrix::translation(2.5, -1.0));
        let inv = m.inverse().unwrap();
        let (x, y) = m.apply(3.0, 7.0);
        assert_close(inv.apply(x, y), (3.0, 7.0));
        assert!(m.then(&inv).is_identity());
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let m = AffineMatrix::from_components([1.0, 2.0, 0.0, 2.0, 4.0, 0.0]);
        assert!(m.inverse().is_none());
    }

    #[test]
    fn test_then_applies_in_order() {
        let rotate = AffineMatrix::rotation_about(90.0, 0.0, 0.0);
        let shift = AffineMatrix::translation(10.0, 0.0);
        // Rotate first: (1, 0) -> (0, -1), then shift -> (10, -1)
        assert_close(rotate.then(&shift).apply(1.0, 0.0), (10.0, -1.0));
        // Shift first: (1, 0) -> (11, 0), then rotate -> (0, -11)
        assert_close(shift.then(&rotate).apply(1.0, 0.0), (0.0, -11.0));
    }

    #[test]
    fn test_identity_detection() {
        assert!(RigidTransform2D::Identity.is_identity());
        assert!(RigidTransform2D::Translate { dx: 0.0, dy: 0.0 }.is_identity());
        assert!(RigidTransform2D::Rotate {
            angle_degrees: 0.0,
            dx: 0.0,
            dy: 0.0
        }
        .is_identity());
        assert!(RigidTransform2D::Rotate {
            angle_degrees: 360.0,
            dx: 0.0,
            dy: 0.0
        }
        .is_identity());
        assert!(!RigidTransform2D::Translate { dx: 0.0, dy: -4.0 }.is_identity());
        assert!(RigidTransform2D::Matrix(AffineMatrix::IDENTITY).is_identity());
    }

    #[test]
    fn test_rotation_center_follows_slice_size() {
        let t = RigidTransform2D::Rotate {
            angle_degrees: 180.0,
            dx: 0.0,
            dy: 0.0,
        };
        let m = t.forward_matrix(11, 7);
        assert_close(m.apply(5.0, 3.0), (5.0, 3.0));
        assert_close(m.apply(0.0, 0.0), (10.0, 6.0));
    }

    #[test]
    fn test_rotate_then_translate() {
        let t = RigidTransform2D::Rotate {
            angle_degrees: 90.0,
            dx: 1.0,
            dy: 2.0,
        };
        let m = t.forward_matrix(5, 5);
        assert_close(m.apply(4.0, 2.0), (3.0, 2.0));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let t = RigidTransform2D::Translate {
            dx: f64::NAN,
            dy: 0.0,
        };
        assert!(matches!(t.validate(), Err(StitchError::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_rejects_singular_matrix() {
        let t = RigidTransform2D::Matrix(AffineMatrix::from_components([0.0; 6]));
        assert!(matches!(t.validate(), Err(StitchError::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_accepts_shear_matrix() {
        let t = RigidTransform2D::Matrix(AffineMatrix::from_components([1.0, 0.2, 5.0, 0.0, 1.0, -3.0]));
        assert!(t.validate().is_ok());
    }
}
