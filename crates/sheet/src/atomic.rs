use crate::error::{Result, SheetError};
use std::fs::File;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with the bytes produced by `fill`.
///
/// The content goes to a temporary file in the same directory which is then
/// renamed over the target, so a failure leaves the original untouched.
pub(crate) fn replace_file<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    fill(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    // Temp files are created 0600; keep whatever the target had.
    if let Ok(metadata) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }

    tmp.persist(path).map_err(|e| SheetError::Io(e.error))?;
    Ok(())
}
