//! File-sync primitives used after PNPM writes into `common/temp`.

use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Copied,
    Removed,
    Unchanged,
}

/// Copy every file under `source` into `destination`, creating directories
/// as needed and overwriting files that already exist. Files present only
/// in `destination` are left alone. Symlinks are followed.
pub fn copy_dir_recursive(source: &Path, destination: &Path) -> io::Result<usize> {
    fs::create_dir_all(destination)?;
    let mut copied = 0;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        let target = destination.join(entry.file_name());
        let mut file_type = entry.file_type()?;
        if file_type.is_symlink() {
            // Copy what the link points at; dangling links and links back
            // into an enclosing folder are skipped.
            let Ok(resolved) = fs::metadata(&path) else {
                tracing::debug!(link = %path.display(), "skipping dangling symlink");
                continue;
            };
            if resolved.is_dir()
                && fs::canonicalize(source)?.starts_with(fs::canonicalize(&path)?)
            {
                tracing::debug!(link = %path.display(), "skipping symlink to an enclosing folder");
                continue;
            }
            file_type = resolved.file_type();
        }
        if file_type.is_dir() {
            copied += copy_dir_recursive(&path, &target)?;
        } else {
            fs::copy(&path, &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Make `destination` match `source`: same bytes when the source exists,
/// absent when it does not.
pub fn sync_file(source: &Path, destination: &Path) -> io::Result<SyncAction> {
    if source.is_file() {
        let content = fs::read(source)?;
        if destination.is_file() && fs::read(destination)? == content {
            return Ok(SyncAction::Unchanged);
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(destination, content)?;
        return Ok(SyncAction::Copied);
    }

    if destination.exists() {
        fs::remove_file(destination)?;
        return Ok(SyncAction::Removed);
    }
    Ok(SyncAction::Unchanged)
}
