use std::fs;
use std::path::Path;

use tracing::info;

use crate::errors::ExportError;

/// File name used when the caller does not choose one.
pub const DEFAULT_FILE_NAME: &str = "horn.stl";

/// Write an encoded exchange file to disk, replacing any existing file.
pub fn save(path: impl AsRef<Path>, bytes: &[u8]) -> Result<(), ExportError> {
    let path = path.as_ref();
    fs::write(path, bytes).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "saved exchange file");
    Ok(())
}
