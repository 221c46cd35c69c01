use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// `<path>.tmp`, in the same directory so the final rename never crosses filesystems.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("file"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Moves a fully written temp file over `target`.
///
/// Readers see either the old or the new file. On Windows the rename cannot
/// overwrite, so the old target is removed immediately before.
pub async fn replace(tmp: &Path, target: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match tokio::fs::remove_file(target).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
    }

    tokio::fs::rename(tmp, target).await
}

/// Write `bytes` to `<path>.tmp` and rename it over `path`.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, bytes).await?;
    replace(&tmp, path).await
}
