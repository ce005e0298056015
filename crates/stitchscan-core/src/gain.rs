//! Grey-value gain.
//!
//! Formula: `output = clamp(round(input * gain), 0, MAX)` where `MAX` is the
//! largest value of the slice's sample type. Saturated values stay
//! saturated, so gain `g` followed by gain `1/g` is not a lossless round
//! trip once anything clipped.

use crate::error::StitchError;
use crate::slice::{Grid, Sample};

/// Reject gains that are not finite and strictly positive.
pub fn validate_gain(gain: f64) -> Result<(), StitchError> {
    if gain.is_finite() && gain > 0.0 {
        Ok(())
    } else {
        Err(StitchError::invalid(format!(
            "gain must be a positive number, got {gain}"
        )))
    }
}

/// Multiply every sample of `grid` by `gain` in place.
pub fn apply_gain<T: Sample>(grid: &mut Grid<T>, gain: f64) {
    // Early exit for unit gain
    if gain == 1.0 {
        return;
    }

    for px in grid.pixels.iter_mut() {
        *px = T::from_f64_clamped(px.to_f64() * gain);
    }
}
