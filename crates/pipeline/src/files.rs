use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// List the files to process for `path`.
///
/// A file yields itself. A directory is walked recursively and yields every
/// regular file below it, whatever its extension, sorted by path.
///
/// # Errors
///
/// Returns `PipelineError::Io` if `path` does not exist and
/// `PipelineError::Walk` if part of the directory cannot be read.
pub fn collect_files<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    debug!(target: "system", dir = %path.display(), count = files.len(), "Collected files");
    Ok(files)
}
