//! The slice transformer: renumber a slice range, optionally warping and
//! scaling every slice on the way.
//!
//! A job goes through three stages:
//!
//! 1. **Validate** ([`SliceTransformer::new`]): range, gain, transform,
//!    templates, path collisions and existing outputs are all checked before
//!    anything is written.
//! 2. **Process** ([`SliceTransformer::run`]): slices are handled one at a
//!    time in input order. Each output is written atomically.
//! 3. **Done**: the number of written slices is returned.
//!
//! The first error aborts the batch. Slices written before it stay on disk;
//! no later index is touched.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StitchError;
use crate::gain::{apply_gain, validate_gain};
use crate::range::{OutputMapping, SliceRange};
use crate::slice::{copy_slice, read_slice, write_slice, Grid, Sample, Slice};
use crate::template::SliceTemplate;
use crate::transform::{warp, AffineMatrix, FillPolicy, RigidTransform2D};

/// Everything a stitch job needs, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchConfig {
    /// Filename of any slice of the input stack; its number sets the padding.
    pub input: PathBuf,
    /// Filename pattern for the output stack.
    pub output: PathBuf,
    /// Input slices to process.
    pub slice_range: SliceRange,
    /// Output index of the first slice of the range.
    pub output_start: u32,
    pub transform: RigidTransform2D,
    /// Multiplicative grey-value correction (1.0 = none).
    pub gain: f64,
    pub fill: FillPolicy,
    /// Replace output files that already exist.
    pub overwrite: bool,
}

impl StitchConfig {
    /// A plain renumbering job: identity transform, unit gain, zero fill.
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        slice_range: SliceRange,
        output_start: u32,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            slice_range,
            output_start,
            transform: RigidTransform2D::Identity,
            gain: 1.0,
            fill: FillPolicy::Zero,
            overwrite: false,
        }
    }

    /// True when slices can be copied without decoding.
    pub fn is_pure_copy(&self) -> bool {
        self.transform.is_identity() && self.gain == 1.0
    }
}

/// Progress report for one written slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceWritten {
    pub input_index: u32,
    pub output_index: u32,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

/// A validated stitch job.
#[derive(Debug, Clone)]
pub struct SliceTransformer {
    config: StitchConfig,
    input: SliceTemplate,
    output: SliceTemplate,
    mapping: OutputMapping,
}

impl SliceTransformer {
    /// Validate `config` without writing anything.
    ///
    /// # Errors
    ///
    /// - [`StitchError::InvalidArgument`] for a bad gain or transform, a
    ///   template without a slice number, an overflowing output index, or an
    ///   output path that would overwrite one of the job's own inputs
    /// - [`StitchError::OutputExists`] if an output file exists and
    ///   `overwrite` is not set
    pub fn new(config: StitchConfig) -> Result<Self, StitchError> {
        validate_gain(config.gain)?;
        config.transform.validate()?;

        let input = SliceTemplate::parse(&config.input)?;
        let output = SliceTemplate::parse(&config.output)?;
        let mapping = OutputMapping::new(config.slice_range, config.output_start)?;

        let job = Self {
            config,
            input,
            output,
            mapping,
        };
        job.check_output_paths()?;

        debug!(
            input = %job.input,
            output = %job.output,
            matrix = ?job.config.transform.forward_matrix(2, 2).components(),
            "Validated stitch job"
        );
        Ok(job)
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    pub fn mapping(&self) -> OutputMapping {
        self.mapping
    }

    /// Number of slices the job will write.
    pub fn len(&self) -> u32 {
        self.mapping.range().len()
    }

    /// A job always covers at least one slice.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `(input path, output path)` for every slice, in processing order.
    pub fn planned_paths(&self) -> impl Iterator<Item = (PathBuf, PathBuf)> + '_ {
        self.mapping
            .pairs()
            .map(|(i, o)| (self.input.render(i), self.output.render(o)))
    }

    /// Process every slice; see [`SliceTransformer::run_with`].
    pub fn run(&self) -> Result<u32, StitchError> {
        self.run_with(|_| {})
    }

    /// Process every slice, calling `on_slice` after each one is written.
    ///
    /// Returns the number of slices written.
    ///
    /// # Errors
    ///
    /// - [`StitchError::MissingSlice`] if an input file of the range is absent
    /// - [`StitchError::Read`] if an input cannot be decoded
    /// - [`StitchError::Write`] if an output cannot be created
    pub fn run_with<F>(&self, mut on_slice: F) -> Result<u32, StitchError>
    where
        F: FnMut(&SliceWritten),
    {
        self.ensure_output_dir()?;

        let mut written = 0;
        for (input_index, output_index) in self.mapping.pairs() {
            let input_path = self.input.render(input_index);
            let output_path = self.output.render(output_index);

            if !input_path.is_file() {
                return Err(StitchError::MissingSlice {
                    index: input_index,
                    path: input_path,
                });
            }

            self.process_slice(&input_path, &output_path)?;
            written += 1;

            info!(
                input = input_index,
                output = output_index,
                "{} -> {}",
                input_path.display(),
                output_path.display()
            );
            on_slice(&SliceWritten {
                input_index,
                output_index,
                input_path,
                output_path,
            });
        }

        Ok(written)
    }

    fn process_slice(&self, input_path: &Path, output_path: &Path) -> Result<(), StitchError> {
        if self.config.is_pure_copy() && same_extension(input_path, output_path) {
            return copy_slice(input_path, output_path);
        }

        let slice = match read_slice(input_path)? {
            Slice::Gray8(g) => Slice::Gray8(self.transform_grid(g)?),
            Slice::Gray16(g) => Slice::Gray16(self.transform_grid(g)?),
        };
        write_slice(output_path, slice)
    }

    fn transform_grid<T: Sample>(&self, mut grid: Grid<T>) -> Result<Grid<T>, StitchError> {
        if self.config.transform.is_identity() {
            apply_gain(&mut grid, self.config.gain);
            return Ok(grid);
        }

        let inverse = self.inverse_matrix(grid.width, grid.height)?;
        Ok(warp(&grid, &inverse, self.config.fill, self.config.gain))
    }

    fn inverse_matrix(&self, width: u32, height: u32) -> Result<AffineMatrix, StitchError> {
        self.config
            .transform
            .forward_matrix(width, height)
            .inverse()
            .ok_or_else(|| StitchError::invalid("transform matrix is not invertible"))
    }

    fn check_output_paths(&self) -> Result<(), StitchError> {
        // Outputs can only clobber inputs when both stacks share a directory
        let inputs: HashSet<OsString> = if same_directory(self.input.dir(), self.output.dir()) {
            self.planned_paths()
                .filter_map(|(input, _)| input.file_name().map(OsStr::to_os_string))
                .collect()
        } else {
            HashSet::new()
        };

        let mut existing = 0usize;
        for (_, output_path) in self.planned_paths() {
            let clobbers = output_path
                .file_name()
                .is_some_and(|name| inputs.contains(name));
            if clobbers {
                return Err(StitchError::invalid(format!(
                    "output {} would overwrite an input slice of the same job",
                    output_path.display()
                )));
            }
            if output_path.exists() {
                if !self.config.overwrite {
                    return Err(StitchError::OutputExists { path: output_path });
                }
                existing += 1;
            }
        }

        if existing > 0 {
            warn!(count = existing, "Output files already exist and will be overwritten");
        }
        Ok(())
    }

    fn ensure_output_dir(&self) -> Result<(), StitchError> {
        let dir = self.output.dir();
        if dir.as_os_str().is_empty() || dir.is_dir() {
            return Ok(());
        }
        info!(dir = %dir.display(), "Creating output directory");
        std::fs::create_dir_all(dir).map_err(|e| StitchError::Write {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Validate `config` and run it; returns the number of slices written.
pub fn process(config: StitchConfig) -> Result<u32, StitchError> {
    SliceTransformer::new(config)?.run()
}

fn same_extension(a: &Path, b: &Path) -> bool {
    let ext = |p: &Path| p.extension().and_then(OsStr::to_str).map(str::to_ascii_lowercase);
    ext(a) == ext(b)
}

/// True if `a` and `b` name the same directory. Existing directories are
/// compared canonically (through `..` and symlinks); otherwise lexically.
fn same_directory(a: &Path, b: &Path) -> bool {
    match (canonical_dir(a), canonical_dir(b)) {
        (Some(a), Some(b)) => a == b,
        _ => normalize(a) == normalize(b),
    }
}

fn canonical_dir(dir: &Path) -> Option<PathBuf> {
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    dir.canonicalize().ok()
}

/// Lexical normalization: drops `.` components and folds `name/..`.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir
                if matches!(out.components().next_back(), Some(Component::Normal(_))) =>
            {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
