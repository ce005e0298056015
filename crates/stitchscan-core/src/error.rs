//! Error type shared by every stage of a stitch job.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while validating or running a stitch job.
#[derive(Debug, Error)]
pub enum StitchError {
    /// A configuration value violates its constraints (range, gain,
    /// transform, template, colliding paths).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The input file for a slice of the range does not exist.
    #[error("Missing input slice {index}: {path}")]
    MissingSlice { index: u32, path: PathBuf },

    /// An input slice exists but could not be decoded.
    #[error("Cannot read slice {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// The destination could not be created or replaced.
    #[error("Cannot write slice {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    /// An output file already exists and overwriting was not requested.
    #[error("Output file already exists: {path} (use --overwrite to replace it)")]
    OutputExists { path: PathBuf },
}

impl StitchError {
    /// Shorthand for [`StitchError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        StitchError::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slice_display() {
        let err = StitchError::MissingSlice {
            index: 109,
            path: PathBuf::from("slices/slice_0109.tif"),
        };
        assert_eq!(
            err.to_string(),
            "Missing input slice 109: slices/slice_0109.tif"
        );
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = StitchError::invalid("gain must be positive, got -1");
        assert_eq!(
            err.to_string(),
            "Invalid argument: gain must be positive, got -1"
        );
    }
}
