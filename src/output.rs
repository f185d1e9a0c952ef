//! Publishing output files.
//!
//! Documents are written to a temporary file beside the destination and
//! renamed into place once complete. A failure at any point leaves the
//! destination untouched and the temporary file is removed on drop.

use crate::error::{EngraveError, EngraveResult};
use image::{GrayImage, ImageFormat};
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

fn write_error(path: &Path, source: std::io::Error) -> EngraveError {
    EngraveError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Atomically replace `path` with `contents`
pub fn write_atomic(path: &Path, contents: &[u8]) -> EngraveResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_error(path, e))?;
    tmp.write_all(contents).map_err(|e| write_error(path, e))?;
    tmp.as_file().sync_all().map_err(|e| write_error(path, e))?;
    tmp.persist(path).map_err(|e| write_error(path, e.error))?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// Encode a grayscale image as PNG and publish it
pub fn write_png(path: &Path, image: &GrayImage) -> EngraveResult<()> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| EngraveError::Encode {
            what: "PNG preview",
            reason: e.to_string(),
        })?;
    write_atomic(path, &bytes)
}
