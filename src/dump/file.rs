//! File operations for dump storage.
//!
//! - Atomic writes: write to a temp file, sync to disk, then rename
//! - Whole-file copies for blobs, creating parent directories as needed

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::deploy::{DeployError, DeployResult};

/// Ensure the parent directory of `path` exists.
///
/// # Errors
///
/// Returns [`DeployError::FileSystem`] if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> DeployResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                DeployError::file_system(
                    format!("Cannot create the directory {}", parent.display()),
                    e,
                )
            })?;
        }
    }
    Ok(())
}

/// Write content to a file atomically.
///
/// Content goes to `<path>.tmp` first, is synced, and is then renamed over
/// the target so readers never observe a half-written dump.
///
/// # Errors
///
/// Returns [`DeployError::FileSystem`] if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> DeployResult<()> {
    ensure_parent_dir(path)?;

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    let write = || -> std::io::Result<()> {
        let file = File::create(temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(temp_path, path)
    };

    write().map_err(|e| {
        DeployError::file_system(format!("Cannot create a dump file {}", path.display()), e)
    })
}

/// Copy a whole file, replacing the destination.
///
/// # Errors
///
/// Returns [`DeployError::FileSystem`] if the destination directory cannot
/// be created or the copy fails.
pub fn copy_file(from: &Path, to: &Path) -> DeployResult<()> {
    ensure_parent_dir(to)?;
    fs::copy(from, to).map_err(|e| {
        DeployError::file_system(
            format!(
                "Cannot copy a blob file from {} to {}",
                from.display(),
                to.display()
            ),
            e,
        )
    })?;
    Ok(())
}
