//! Slice filename templates.
//!
//! A template is an example filename from a numbered stack, such as
//! `recons/slices/slice_0107.tif`. The last run of ASCII digits in the file
//! stem (neither the directory nor the extension is inspected, unless the
//! stem has no digits at all) is the slice index; it is parsed
//! once into `(prefix, width, suffix)` so sibling filenames can be rendered
//! for any other index with the same zero-padding.
//!
//! ```ignore
//! let template = SliceTemplate::parse("slices/slice_0000.tif")?;
//! assert_eq!(template.render(42), PathBuf::from("slices/slice_0042.tif"));
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::StitchError;

/// A parsed slice filename with a zero-padded numeric index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceTemplate {
    dir: PathBuf,
    prefix: String,
    width: usize,
    suffix: String,
    index: u32,
}

impl SliceTemplate {
    /// Parse a filename into a template.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::InvalidArgument`] if the path has no UTF-8 file
    /// name, the file name contains no digits, or the index does not fit in
    /// a `u32`.
    pub fn parse(path: impl AsRef<Path>) -> Result<Self, StitchError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                StitchError::invalid(format!("{} has no usable file name", path.display()))
            })?;

        let stem_len = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .map_or(name.len(), str::len);

        let (start, end) = last_digit_run(&name[..stem_len])
            .or_else(|| last_digit_run(name))
            .ok_or_else(|| {
                StitchError::invalid(format!("file name {name:?} contains no slice number"))
            })?;

        let digits = &name[start..end];
        let index = digits.parse::<u32>().map_err(|_| {
            StitchError::invalid(format!("slice number {digits} in {name:?} is too large"))
        })?;

        Ok(Self {
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            prefix: name[..start].to_string(),
            width: end - start,
            suffix: name[end..].to_string(),
            index,
        })
    }

    /// Render the path of the slice with the given index.
    ///
    /// Indices are zero-padded to the template width; indices that need more
    /// digits are written in full.
    pub fn render(&self, index: u32) -> PathBuf {
        self.dir.join(format!(
            "{}{:0width$}{}",
            self.prefix,
            index,
            self.suffix,
            width = self.width
        ))
    }

    /// The index embedded in the template filename.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Number of digits of the index field.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Directory the slices live in (empty for bare file names).
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl fmt::Display for SliceTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{}{}{}", self.prefix, "#".repeat(self.width), self.suffix);
        write!(f, "{}", self.dir.join(name).display())
    }
}

/// Byte range of the last run of ASCII digits in `name`.
fn last_digit_run(name: &str) -> Option<(usize, usize)> {
    let bytes = name.as_bytes();
    let end = bytes.iter().rposition(u8::is_ascii_digit)? + 1;
    let start = bytes[..end]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    Some((start, end))
}
