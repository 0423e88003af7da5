//! Convenience helpers for working with files on disk.
//!
//! Two failure philosophies coexist here. Size queries, deletion, and the
//! filesystem walk are best-effort: they swallow I/O failures and return a
//! safe default (zero bytes, nothing deleted, an empty walk), logging a
//! diagnostic instead of surfacing an error, so cleanup and reporting code
//! never aborts a larger pipeline run. Moves, directory creation, and
//! file-store resolution are preconditions for subsequent work and fail
//! loudly with [`FsError`].
//!
//! None of these operations are safe to call concurrently on the same path
//! without external synchronization; no locking is performed internally.

use crate::error::FsError;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::error;
use walkdir::WalkDir;

/// Returns the size of the file at `path` in bytes, or 0 if it is missing
/// or inaccessible.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}

/// Returns the combined size of all regular files under `path`, or 0 if the
/// walk fails (e.g. the directory is missing).
pub fn directory_size(path: &Path) -> u64 {
    let mut total = 0;
    for entry in WalkDir::new(path) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => total += file_size(entry.path()),
            Ok(_) => {}
            Err(_) => return 0,
        }
    }
    total
}

/// Returns the size of the directory or file at `path`, or 0 if it is
/// missing or inaccessible.
pub fn size(path: &Path) -> u64 {
    if path.is_dir() {
        directory_size(path)
    } else {
        file_size(path)
    }
}

/// Deletes the file at `path` if it exists, failing silently if it doesn't.
pub fn delete_file(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            error!("unable to delete {}: {err}", path.display());
        }
    }
}

/// Deletes all files and subdirectories under `path`, deepest paths first so
/// directories are empty by the time they are removed. A missing directory
/// is silent success.
pub fn delete_directory(path: &Path) {
    for entry in WalkDir::new(path).contents_first(true) {
        match entry {
            Ok(entry) => {
                let removed = if entry.file_type().is_dir() {
                    fs::remove_dir(entry.path())
                } else {
                    fs::remove_file(entry.path())
                };
                if let Err(err) = removed {
                    error!("unable to delete {}: {err}", entry.path().display());
                }
            }
            Err(err) => {
                let missing_root = err.depth() == 0
                    && err
                        .io_error()
                        .is_some_and(|io| io.kind() == io::ErrorKind::NotFound);
                if !missing_root {
                    error!("unable to walk {}: {err}", path.display());
                }
            }
        }
    }
}

/// Deletes files or directories recursively, failing silently if missing.
/// One path's failure never stops processing of the rest.
pub fn delete<I, P>(paths: I)
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            delete_directory(path);
        } else {
            delete_file(path);
        }
    }
}

/// Moves a file.
///
/// Parent directories of `to` are never created on behalf of a move, and
/// whether an existing destination is replaced follows platform `rename`
/// semantics.
pub fn move_file(from: &Path, to: &Path) -> Result<(), FsError> {
    fs::rename(from, to).map_err(|source| FsError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

/// Ensures a directory and all parent directories exist.
pub fn create_directory(path: &Path) -> Result<(), FsError> {
    fs::create_dir_all(path).map_err(|source| FsError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

/// Ensures all parent directories of each path in `paths` exist. A path that
/// already names an existing directory needs no work.
pub fn create_parent_directories<I, P>(paths: I) -> Result<(), FsError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            continue;
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| FsError::CreateParents {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }
    }
    Ok(())
}

/// Returns true if `path` ends with `".{extension}"`, case-insensitive.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.to_string_lossy()
        .to_lowercase()
        .ends_with(&format!(".{}", extension.to_lowercase()))
}

/// Volume statistics for the file store backing a path.
#[derive(Debug, Clone, Serialize)]
pub struct FileStore {
    /// The existing ancestor the volume lookup resolved against.
    pub path: PathBuf,
    /// Total capacity of the volume in bytes.
    pub total_space: u64,
    /// Bytes still available on the volume.
    pub available_space: u64,
}

/// Returns the [`FileStore`] for `path`, or for its nearest existing
/// ancestor if the path does not exist yet.
///
/// The search iterates upward through parent directories; it fails only if
/// not even the filesystem root yields a file store.
pub fn get_file_store(path: &Path) -> Result<FileStore, FsError> {
    let absolute = std::path::absolute(path).map_err(|source| FsError::FileStore {
        path: path.to_path_buf(),
        source,
    })?;
    let mut last_error = None;
    for ancestor in absolute.ancestors() {
        match volume_stats(ancestor) {
            Ok(store) => return Ok(store),
            Err(err) => last_error = Some(err),
        }
    }
    Err(FsError::FileStore {
        path: path.to_path_buf(),
        source: last_error.unwrap_or_else(|| io::Error::from(io::ErrorKind::NotFound)),
    })
}

fn volume_stats(path: &Path) -> io::Result<FileStore> {
    let total_space = fs4::total_space(path)?;
    let available_space = fs4::available_space(path)?;
    Ok(FileStore {
        path: path.to_path_buf(),
        total_space,
        available_space,
    })
}

/// Lists every path reachable from each root in `roots`.
///
/// The sequence is lazy; each call walks afresh. A root that cannot be
/// walked is logged and contributes nothing rather than aborting the rest
/// of the sequence.
pub fn walk_file_system<I, P>(roots: I) -> impl Iterator<Item = PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    roots.into_iter().flat_map(|root| {
        let root = root.as_ref().to_path_buf();
        WalkDir::new(&root)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => Some(entry.into_path()),
                Err(err) => {
                    error!("unable to walk {}: {err}", root.display());
                    None
                }
            })
    })
}

/// Deletes a file or directory (recursively) when the guard is dropped.
///
/// Deletion is best-effort, like [`delete`]: failures are logged, never
/// raised from `drop`.
#[must_use]
#[derive(Debug)]
pub struct DeleteOnDrop {
    path: PathBuf,
}

impl DeleteOnDrop {
    /// Registers `path` for deletion when the returned guard is dropped.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this guard will delete.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DeleteOnDrop {
    fn drop(&mut self) {
        delete([&self.path]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension_case_insensitive() {
        assert!(has_extension(Path::new("planet.osm.PBF"), "pbf"));
        assert!(has_extension(Path::new("tiles.mbtiles"), "MBTILES"));
        assert!(has_extension(Path::new("archive.Zip"), "zip"));
    }

    #[test]
    fn test_has_extension_requires_dot() {
        assert!(!has_extension(Path::new("mbtiles"), "mbtiles"));
        assert!(!has_extension(Path::new("tiles.mbtiles"), "tiles"));
        assert!(!has_extension(Path::new("notazip"), "zip"));
    }

    #[test]
    fn test_has_extension_compound() {
        assert!(has_extension(Path::new("data/planet.osm.pbf"), "osm.pbf"));
        assert!(!has_extension(Path::new("data/planet.osm.pbf"), "osm"));
    }

    #[test]
    fn test_file_size_missing_is_zero() {
        assert_eq!(file_size(Path::new("/no/such/file/anywhere")), 0);
    }
}
