//! Slice ranges and input-to-output index mapping.

use serde::{Deserialize, Serialize};

use crate::error::StitchError;

/// Inclusive range of input slice indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSliceRange")]
pub struct SliceRange {
    start: u32,
    end: u32,
}

/// Unchecked serialized form of [`SliceRange`].
#[derive(Deserialize)]
struct RawSliceRange {
    start: u32,
    end: u32,
}

impl TryFrom<RawSliceRange> for SliceRange {
    type Error = StitchError;

    fn try_from(raw: RawSliceRange) -> Result<Self, Self::Error> {
        SliceRange::new(raw.start, raw.end)
    }
}

impl SliceRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: u32, end: u32) -> Result<Self, StitchError> {
        if start > end {
            return Err(StitchError::invalid(format!(
                "slice range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of slices in the range (never zero).
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// A range always holds at least one slice.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: u32) -> bool {
        (self.start..=self.end).contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Maps every input index of a range to its renumbered output index:
/// `i -> i - start + output_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOutputMapping")]
pub struct OutputMapping {
    range: SliceRange,
    output_start: u32,
}

#[derive(Deserialize)]
struct RawOutputMapping {
    range: SliceRange,
    output_start: u32,
}

impl TryFrom<RawOutputMapping> for OutputMapping {
    type Error = StitchError;

    fn try_from(raw: RawOutputMapping) -> Result<Self, Self::Error> {
        OutputMapping::new(raw.range, raw.output_start)
    }
}

impl OutputMapping {
    /// Create a mapping, rejecting output indices that would overflow `u32`.
    pub fn new(range: SliceRange, output_start: u32) -> Result<Self, StitchError> {
        if output_start.checked_add(range.end - range.start).is_none() {
            return Err(StitchError::invalid(format!(
                "output start {output_start} is too large for {} slices",
                range.len()
            )));
        }
        Ok(Self {
            range,
            output_start,
        })
    }

    pub fn range(&self) -> SliceRange {
        self.range
    }

    pub fn output_start(&self) -> u32 {
        self.output_start
    }

    /// Last output index written by the mapping.
    pub fn output_end(&self) -> u32 {
        self.output_start + (self.range.end - self.range.start)
    }

    /// Output index for `input`, or `None` if it lies outside the range.
    pub fn map(&self, input: u32) -> Option<u32> {
        self.range
            .contains(input)
            .then(|| input - self.range.start + self.output_start)
    }

    /// `(input, output)` pairs in input order.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> {
        let start = self.range.start;
        let output_start = self.output_start;
        self.range
            .iter()
            .map(move |i| (i, i - start + output_start))
    }
}
