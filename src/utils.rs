use crate::error::Res;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Create a directory and any missing parents.
pub(crate) async fn make_dir(path: impl AsRef<Path>) -> Res<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory {}", path.display()))
}

/// Resolve `path` to an absolute path. The path must exist.
pub(crate) async fn canonicalize(path: impl AsRef<Path>) -> Res<PathBuf> {
    let path = path.as_ref();
    tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Unable to resolve path {}", path.display()))
}

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Res<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub(crate) async fn read(path: impl AsRef<Path>) -> Res<String> {
    let path = path.as_ref();
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}
