//! Reading and writing slice files.
//!
//! Decoding and encoding go through the `image` crate; the file format is
//! guessed from content on read and taken from the extension on write.
//! Every write lands in a temporary file next to the destination and is
//! renamed into place, so a failed write never leaves a truncated slice
//! behind. Copies keep the source's permissions; encoded slices get the
//! usual `0o644` (less the umask) on Unix.

use std::fs::{File, Permissions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Luma};
use tempfile::NamedTempFile;

use super::{Grid, Slice};
use crate::error::StitchError;

/// Mode for newly encoded slices, before the umask.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Decode a grayscale slice from disk.
///
/// # Errors
///
/// Returns [`StitchError::Read`] if the file cannot be opened or decoded, or
/// if it is not 8- or 16-bit single-channel.
pub fn read_slice(path: &Path) -> Result<Slice, StitchError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| read_error(path, e))?;

    let img = reader.decode().map_err(|e| read_error(path, e))?;

    match img {
        DynamicImage::ImageLuma8(buf) => {
            let (width, height) = buf.dimensions();
            Ok(Slice::Gray8(Grid::new(width, height, buf.into_raw())))
        }
        DynamicImage::ImageLuma16(buf) => {
            let (width, height) = buf.dimensions();
            Ok(Slice::Gray16(Grid::new(width, height, buf.into_raw())))
        }
        other => Err(read_error(
            path,
            format!(
                "unsupported pixel type {:?}, expected 8- or 16-bit grayscale",
                other.color()
            ),
        )),
    }
}

/// Encode a slice to `path`, choosing the format from the extension.
///
/// # Errors
///
/// Returns [`StitchError::Write`] if the extension has no known format, the
/// format cannot hold the slice's bit depth, or the file cannot be created.
pub fn write_slice(path: &Path, slice: Slice) -> Result<(), StitchError> {
    let format = ImageFormat::from_path(path).map_err(|e| write_error(path, e))?;

    let image = match slice {
        Slice::Gray8(g) => ImageBuffer::<Luma<u8>, _>::from_raw(g.width, g.height, g.pixels)
            .map(DynamicImage::ImageLuma8),
        Slice::Gray16(g) => ImageBuffer::<Luma<u16>, _>::from_raw(g.width, g.height, g.pixels)
            .map(DynamicImage::ImageLuma16),
    }
    .ok_or_else(|| write_error(path, "pixel buffer does not match slice dimensions"))?;

    write_atomically(path, None, |writer| {
        image.write_to(writer, format).map_err(io::Error::other)
    })
}

/// Copy a slice file byte for byte to `dst`.
///
/// # Errors
///
/// Returns [`StitchError::Read`] if `src` cannot be opened and
/// [`StitchError::Write`] if `dst` cannot be written.
pub fn copy_slice(src: &Path, dst: &Path) -> Result<(), StitchError> {
    let mut source = File::open(src).map_err(|e| read_error(src, e))?;
    let permissions = source
        .metadata()
        .map_err(|e| read_error(src, e))?
        .permissions();
    write_atomically(dst, Some(permissions), |writer| {
        io::copy(&mut source, writer).map(|_| ())
    })
}

/// Write through a temporary file in the destination directory, then rename
/// it over `path`. `permissions` replaces the default new-file mode.
fn write_atomically<F>(
    path: &Path,
    permissions: Option<Permissions>,
    fill: F,
) -> Result<(), StitchError>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".stitch-").suffix(".part");
    // Temporary files default to owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(Permissions::from_mode(NEW_FILE_MODE));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(|e| write_error(path, e))?;

    {
        let mut writer = BufWriter::new(&mut tmp);
        fill(&mut writer).map_err(|e| write_error(path, e))?;
        writer.flush().map_err(|e| write_error(path, e))?;
    }

    if let Some(permissions) = permissions {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(|e| write_error(path, e))?;
    }

    tmp.persist(path).map_err(|e| write_error(path, e.error))?;
    Ok(())
}

fn read_error(path: &Path, reason: impl ToString) -> StitchError {
    StitchError::Read {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn write_error(path: &Path, reason: impl ToString) -> StitchError {
    StitchError::Write {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
