//! Atomic writes for generated certificates.
//!
//! The document is written to a temp file in the destination directory, flushed and synced,
//! then persisted over the destination. A failed write leaves any existing file untouched.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` is `Some("")` for a bare file name.
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

pub fn write_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = parent_dir_or_dot(dest);
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|err| err.error)?;
    Ok(())
}

/// Where to write a certificate: `out` itself, `suggested` inside `out` when it is a directory,
/// or `suggested` in the working directory.
pub fn destination(out: Option<&Path>, suggested: &str) -> PathBuf {
    match out {
        Some(dir) if dir.is_dir() => dir.join(suggested),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(suggested),
    }
}
