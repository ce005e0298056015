//! Command line arguments and their conversion into a [`StitchConfig`].

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};
use stitchscan_core::{AffineMatrix, FillPolicy, RigidTransform2D, SliceRange, StitchConfig, StitchError};

const EXAMPLES: &str = "\
EXAMPLES:
  Renumber slices 107-112 of a scan to 30-35, shifting them 4 pixels up:

    stitch-scan recons/scan_Z0.0mm/slices/slice_0000.tif \\
                recons/scan_Z0.0mm/slices_transform/slice_0000.tif \\
                -si 107 112 -so 30 --translate 0 -4 --overwrite";

/// Merge stitch scan reconstructions.
#[derive(Parser, Debug)]
#[command(name = "stitch-scan", version, after_help = EXAMPLES)]
#[command(group(ArgGroup::new("transform").args(["translate", "affine", "matrix"])))]
pub struct Cli {
    /// Input slice filename; its slice number sets the zero padding
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output slice filename; the slice number is replaced for every slice
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Slices to be stitched (first, last), also -si
    #[arg(
        long = "slice-input",
        visible_alias = "slicesin",
        num_args = 2,
        value_names = ["START", "END"],
        required = true
    )]
    pub slice_input: Vec<u32>,

    /// First slice number after stitching, also -so
    #[arg(long = "slice-output", visible_alias = "sliceout", value_name = "START")]
    pub slice_output: u32,

    /// Translation in pixels (positive = right, down)
    #[arg(
        short = 't',
        long,
        num_args = 2,
        value_names = ["DX", "DY"],
        allow_negative_numbers = true
    )]
    pub translate: Option<Vec<f64>>,

    /// Rotation about the slice center in degrees (counter-clockwise), then translation
    #[arg(
        short = 'a',
        long,
        num_args = 3,
        value_names = ["ANGLE", "DX", "DY"],
        allow_negative_numbers = true
    )]
    pub affine: Option<Vec<f64>>,

    /// 2D affine matrix components
    #[arg(
        short = 'm',
        long,
        num_args = 6,
        value_names = ["A11", "A12", "ATX", "A21", "A22", "ATY"],
        allow_negative_numbers = true
    )]
    pub matrix: Option<Vec<f64>>,

    /// Grey-value gain factor
    #[arg(short = 'g', long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub gain: f64,

    /// Fill for pixels moved in from outside the slice
    #[arg(long, value_enum, default_value_t = FillArg::Zero)]
    pub fill: FillArg,

    /// Overwrite existing files
    #[arg(long)]
    pub overwrite: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FillArg {
    /// Zero outside the slice
    Zero,
    /// Repeat the nearest border pixel
    Edge,
}

impl From<FillArg> for FillPolicy {
    fn from(fill: FillArg) -> Self {
        match fill {
            FillArg::Zero => FillPolicy::Zero,
            FillArg::Edge => FillPolicy::Edge,
        }
    }
}

impl Cli {
    /// Parse the process arguments, accepting the two-letter `-si`/`-so` flags.
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Build the job configuration; range and transform shape are checked here,
    /// everything else when the job is validated.
    pub fn into_config(self) -> Result<StitchConfig, StitchError> {
        let (start, end) = match self.slice_input.as_slice() {
            [start, end] => (*start, *end),
            other => {
                return Err(StitchError::invalid(format!(
                    "--slice-input takes START END, got {other:?}"
                )))
            }
        };

        let transform = self.transform()?;
        let mut config = StitchConfig::new(
            self.input,
            self.output,
            SliceRange::new(start, end)?,
            self.slice_output,
        );
        config.transform = transform;
        config.gain = self.gain;
        config.fill = self.fill.into();
        config.overwrite = self.overwrite;
        Ok(config)
    }

    fn transform(&self) -> Result<RigidTransform2D, StitchError> {
        if let Some(values) = &self.matrix {
            let components: [f64; 6] = values.as_slice().try_into().map_err(|_| {
                StitchError::invalid(format!("--matrix takes 6 components, got {}", values.len()))
            })?;
            return Ok(RigidTransform2D::Matrix(AffineMatrix::from_components(components)));
        }

        if let Some(values) = &self.affine {
            return match values.as_slice() {
                [angle_degrees, dx, dy] => Ok(RigidTransform2D::Rotate {
                    angle_degrees: *angle_degrees,
                    dx: *dx,
                    dy: *dy,
                }),
                _ => Err(StitchError::invalid("--affine takes ANGLE DX DY")),
            };
        }

        if let Some(values) = &self.translate {
            return match values.as_slice() {
                [dx, dy] => Ok(RigidTransform2D::Translate { dx: *dx, dy: *dy }),
                _ => Err(StitchError::invalid("--translate takes DX DY")),
            };
        }

        Ok(RigidTransform2D::Identity)
    }
}

/// Rewrite the two-letter single-dash flags to their long forms.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| match arg.to_str() {
            Some("-si") => OsString::from("--slice-input"),
            Some("-so") => OsString::from("--slice-output"),
            _ => arg,
        })
        .collect()
}
